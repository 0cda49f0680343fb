//! Tests for layer precedence and the shared registry.

use std::sync::Arc;
use std::thread;

use crate::identity::Invocation;

use super::defaults;
use super::key::ConfigKey;
use super::layer::{FileRole, Layer, SourceLayer};
use super::registry::{ConfigRegistry, OverlayUpdate, Sources};
use super::value::Value;

/// A value of the key's type that is distinct per `tag`.
fn sample(key: ConfigKey, tag: &str) -> Value {
    match key.kind() {
        super::ValueKind::String => Value::String(format!("{tag}-{key}")),
        super::ValueKind::StringList => Value::List(vec![format!("{tag}-{key}")]),
        // Alternate so adjacent layers differ.
        super::ValueKind::Bool => Value::Bool(tag.len() % 2 == 0),
    }
}

fn only(key: ConfigKey, tag: &str) -> Layer {
    Layer::new().with(key, sample(key, tag))
}

fn users(names: &[&str]) -> Layer {
    Layer::new().with(
        ConfigKey::UiUsers,
        Value::List(names.iter().map(ToString::to_string).collect()),
    )
}

mod precedence {
    use super::*;

    #[test]
    fn topmost_layer_wins_for_every_key() {
        for key in ConfigKey::ALL {
            let sources = Sources {
                defaults: defaults::layer(Invocation::Superuser),
                primary: only(key, "primary"),
                overlay: only(key, "overlay"),
                environment: only(key, "env"),
                flags: only(key, "flag"),
            };
            assert_eq!(sources.merge().get(key), Some(&sample(key, "flag")), "{key}");
            assert_eq!(sources.origin(key), Some(SourceLayer::Flag));

            let sources = Sources {
                flags: Layer::new(),
                ..sources
            };
            assert_eq!(sources.merge().get(key), Some(&sample(key, "env")), "{key}");
            assert_eq!(sources.origin(key), Some(SourceLayer::Environment));

            let sources = Sources {
                environment: Layer::new(),
                ..sources
            };
            assert_eq!(sources.merge().get(key), Some(&sample(key, "overlay")), "{key}");
            assert_eq!(
                sources.origin(key),
                Some(SourceLayer::File(FileRole::Overlay))
            );

            let sources = Sources {
                overlay: Layer::new(),
                ..sources
            };
            assert_eq!(sources.merge().get(key), Some(&sample(key, "primary")), "{key}");
            assert_eq!(
                sources.origin(key),
                Some(SourceLayer::File(FileRole::Primary))
            );

            let sources = Sources {
                primary: Layer::new(),
                ..sources
            };
            assert_eq!(
                sources.merge().get(key),
                defaults::layer(Invocation::Superuser).get(key),
                "{key}"
            );
            assert_eq!(sources.origin(key), Some(SourceLayer::Default));
        }
    }

    #[test]
    fn each_layer_alone_overrides_defaults() {
        let key = ConfigKey::StoreEndpoint;
        let base = Sources {
            defaults: defaults::layer(Invocation::Superuser),
            ..Sources::default()
        };

        let cases = [
            Sources { primary: only(key, "p"), ..base.clone() },
            Sources { overlay: only(key, "o"), ..base.clone() },
            Sources { environment: only(key, "e"), ..base.clone() },
            Sources { flags: only(key, "f"), ..base.clone() },
        ];

        for (sources, tag) in cases.iter().zip(["p", "o", "e", "f"]) {
            assert_eq!(sources.merge().get(key), Some(&sample(key, tag)));
        }
    }

    #[test]
    fn absent_keys_fall_through() {
        let sources = Sources {
            defaults: defaults::layer(Invocation::Superuser),
            flags: only(ConfigKey::LogFile, "flag"),
            ..Sources::default()
        };

        let merged = sources.merge();

        assert_eq!(merged.get(ConfigKey::LogFile), Some(&sample(ConfigKey::LogFile, "flag")));
        assert_eq!(
            merged.get(ConfigKey::StoreEndpoint),
            Some(&Value::String(defaults::SYSTEM_STORE_ENDPOINT.to_string()))
        );
    }

    #[test]
    fn lists_are_replaced_not_concatenated() {
        let sources = Sources {
            primary: users(&["alice"]),
            overlay: users(&["bob", "carol"]),
            ..Sources::default()
        };

        assert_eq!(
            sources.merge().get(ConfigKey::UiUsers),
            Some(&Value::List(vec!["bob".to_string(), "carol".to_string()]))
        );
    }
}

mod registry {
    use super::*;

    fn registry_with_overlay(overlay: Layer) -> ConfigRegistry {
        ConfigRegistry::new(Sources {
            defaults: defaults::layer(Invocation::Superuser),
            overlay,
            ..Sources::default()
        })
    }

    #[test]
    fn get_reads_merged_values() {
        let registry = registry_with_overlay(users(&["alice"]));

        assert_eq!(
            registry.get(ConfigKey::PhenixBaseDir),
            Some(Value::String("/phenix".to_string()))
        );
        assert_eq!(registry.get(ConfigKey::ErrorStderr), Some(Value::Bool(true)));
        assert_eq!(
            registry.get(ConfigKey::UiUsers),
            Some(Value::List(vec!["alice".to_string()]))
        );
    }

    #[test]
    fn replace_overlay_remerges() {
        let registry = registry_with_overlay(users(&["alice"]));

        let update = registry.replace_overlay(users(&["alice", "bob"]));

        assert_eq!(
            update,
            OverlayUpdate::Applied {
                users: vec!["alice".to_string(), "bob".to_string()]
            }
        );
        assert_eq!(registry.settings().users, vec!["alice", "bob"]);
    }

    #[test]
    fn identical_overlay_is_unchanged() {
        let registry = registry_with_overlay(users(&["alice"]));

        assert_eq!(registry.replace_overlay(users(&["alice"])), OverlayUpdate::Unchanged);
        assert_eq!(registry.settings().users, vec!["alice"]);
    }

    #[test]
    fn overlay_update_does_not_beat_higher_layers() {
        let registry = ConfigRegistry::new(Sources {
            defaults: defaults::layer(Invocation::Superuser),
            environment: users(&["from-env"]),
            ..Sources::default()
        });

        let update = registry.replace_overlay(users(&["from-file"]));

        assert_eq!(
            update,
            OverlayUpdate::Applied {
                users: vec!["from-env".to_string()]
            }
        );
    }

    #[test]
    fn readers_never_see_partial_overlay() {
        let overlay_a = users(&["a1", "a2"]).with(
            ConfigKey::PhenixBaseDir,
            Value::String("/a".to_string()),
        );
        let overlay_b = users(&["b1", "b2"]).with(
            ConfigKey::PhenixBaseDir,
            Value::String("/b".to_string()),
        );
        let registry = Arc::new(registry_with_overlay(overlay_a.clone()));

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..500 {
                    let next = if i % 2 == 0 { &overlay_b } else { &overlay_a };
                    registry.replace_overlay(next.clone());
                }
            })
        };

        for _ in 0..500 {
            let settings = registry.settings();
            let prefix = if settings.phenix_base_dir.ends_with("a") { "a" } else { "b" };
            assert!(settings.users.iter().all(|u| u.starts_with(prefix)));
        }

        writer.join().unwrap();
    }
}
