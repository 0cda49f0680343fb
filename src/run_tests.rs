//! Tests for the run module.

use std::path::PathBuf;

use phenix::config::{Layer, SearchPath};
use phenix::identity::EffectiveIdentity;
use tempfile::{TempDir, tempdir};

use super::*;

mod run_error {
    use super::*;

    #[test]
    fn bootstrap_error_is_transparent() {
        let inner = BootstrapError::Seed(phenix::collab::CollabError::Seed("no store".to_string()));
        let expected = inner.to_string();

        let error = RunError::from(inner);

        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn signal_error_displays_source() {
        let error = RunError::Signal(io::Error::other("no handler"));
        assert_eq!(error.to_string(), "Failed to install signal handler: no handler");
    }

    #[test]
    fn debug_format_works() {
        let error = RunError::Help(io::Error::other("closed"));
        assert!(format!("{error:?}").contains("Help"));
    }
}

mod show {
    use super::*;

    struct Started {
        _home: TempDir,
        config_dir: TempDir,
        session: Session,
    }

    fn start(config: Option<&str>, flags: Layer) -> Started {
        let home = tempdir().unwrap();
        let config_dir = tempdir().unwrap();
        if let Some(content) = config {
            std::fs::write(config_dir.path().join("config.toml"), content).unwrap();
        }

        let bootstrap = Bootstrap::with_search(
            EffectiveIdentity::new("1000", Some(home.path().to_path_buf())),
            SearchPath::from_dirs([config_dir.path().to_path_buf()]),
        );
        let users = Arc::new(UserDirectory::new());
        let session = bootstrap
            .start(flags, |_| None, &bundled_collaborators(&users))
            .unwrap();

        Started {
            _home: home,
            config_dir,
            session,
        }
    }

    #[test]
    fn lists_every_key_with_origin() {
        let started = start(None, Layer::new());

        let rendered = render_settings(&started.session);

        for key in ConfigKey::ALL {
            assert!(rendered.contains(key.name()), "missing {key}");
        }
        assert!(rendered.contains("log.error-stderr     = true (default)"));
        assert!(rendered.contains("config file: (none)"));
        assert!(rendered.contains("users file: (none)"));
    }

    #[test]
    fn reports_file_and_flag_origins() {
        let flags = Layer::new().with(
            ConfigKey::MinimegaBaseDir,
            phenix::config::Value::String("/opt/minimega".to_string()),
        );
        let started = start(Some("[store]\nendpoint = \"etcd://db:2379\"\n"), flags);

        let rendered = render_settings(&started.session);

        assert!(rendered.contains("store.endpoint       = etcd://db:2379 (config file)"));
        assert!(rendered.contains("base-dir.minimega    = /opt/minimega (flag)"));
        let config_path: PathBuf = started.config_dir.path().join("config.toml");
        assert!(rendered.contains(&format!("config file: {}", config_path.display())));
    }

    #[test]
    fn bundled_collaborators_reject_bad_endpoint() {
        let home = tempdir().unwrap();
        let bootstrap = Bootstrap::with_search(
            EffectiveIdentity::new("1000", Some(home.path().to_path_buf())),
            SearchPath::from_dirs([home.path().to_path_buf()]),
        );
        let flags = Layer::new().with(
            ConfigKey::StoreEndpoint,
            phenix::config::Value::String("mysql://db/phenix".to_string()),
        );
        let users = Arc::new(UserDirectory::new());

        let result = bootstrap.start(flags, |_| None, &bundled_collaborators(&users));

        assert!(matches!(result, Err(BootstrapError::Store(_))));
    }
}
