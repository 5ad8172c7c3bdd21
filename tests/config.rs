// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests repo YAML, hooks, runners, env interpolation and error reporting.

use std::time::Duration;
use wharf::config::*;
use wharf::error::{Error, ErrorKind};
use wharf::types::BranchName;

const FULL: &str = r#"
branches:
  production:
    branch: master
    env:
      RUST_LOG: info
      WORKERS: 4
      DEBUG: false
    hooks:
      before_build: ./prepare.sh
      build: [make, make install]
      maintenance: ./migrate.sh
    custom_cmds:
      shell: ./console.sh
    runners:
      web:
        type: SimpleProcess
        cmd: ./server --port 8000
        process_count: 2
        stop_timeout: 45s
      worker:
        type: Shell
        start: ./worker start
        stop: ./worker stop
  staging: {}
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config = RepoConfig::from_yaml(FULL).unwrap();
        let production = BranchName::new("production").unwrap();
        let branch = &config.branches[&production];

        assert_eq!(branch.tracked_ref(&production), "master");
        assert_eq!(branch.custom_cmds["shell"], "./console.sh");
        assert_eq!(branch.runners.len(), 2);

        let RunnerConfig::SimpleProcess(web) = &branch.runners["web"] else {
            panic!("web should be SimpleProcess");
        };
        assert_eq!(web.process_count, 2);
        assert_eq!(web.stop_timeout, Duration::from_secs(45));
        assert_eq!(branch.runners["worker"].type_name(), "Shell");
    }

    #[test]
    fn branch_defaults() {
        let config = RepoConfig::from_yaml(FULL).unwrap();
        let staging = BranchName::new("staging").unwrap();
        let branch = &config.branches[&staging];

        assert_eq!(branch.tracked_ref(&staging), "staging");
        assert!(branch.runners.is_empty());
        assert!(branch.hooks.commands(HookPoint::Maintenance).is_none());
        let build = branch.hooks.commands(HookPoint::Build).unwrap();
        assert_eq!(
            build.iter().collect::<Vec<_>>(),
            ["if [ -f ./.build.sh ]; then ./.build.sh; fi"]
        );
    }

    #[test]
    fn hook_lists_keep_order() {
        let config = RepoConfig::from_yaml(FULL).unwrap();
        let branch = &config.branches[&BranchName::new("production").unwrap()];
        let build = branch.hooks.commands(HookPoint::Build).unwrap();
        assert_eq!(build.iter().collect::<Vec<_>>(), ["make", "make install"]);
    }

    #[test]
    fn scalar_env_values_render_as_strings() {
        let config = RepoConfig::from_yaml(FULL).unwrap();
        let branch = &config.branches[&BranchName::new("production").unwrap()];
        let env = resolve_env_map(&branch.env).unwrap();
        assert_eq!(env["RUST_LOG"], "info");
        assert_eq!(env["WORKERS"], "4");
        assert_eq!(env["DEBUG"], "false");
    }
}

mod validation {
    use super::*;

    #[test]
    fn unknown_runner_type_is_rejected() {
        let yaml = "branches:\n  main:\n    runners:\n      web:\n        type: Docker\n";
        assert!(RepoConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn invalid_branch_key_is_rejected() {
        let err = RepoConfig::from_yaml("branches:\n  'feature/x': {}\n").unwrap_err();
        assert!(err.to_string().contains("invalid character in branch name: '/'"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RepoConfig::from_yaml("branches:\n  main:\n    runner: {}\n").is_err());
    }

    #[test]
    fn empty_hook_list_is_rejected() {
        assert!(RepoConfig::from_yaml("branches:\n  main:\n    hooks:\n      build: []\n").is_err());
    }
}

mod loading {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RepoConfig::load(&dir.path().join("shop.yml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.yml");
        fs::write(&path, "branches:\n  main:\n    runners:\n      web:\n        type: Nope\n").unwrap();

        let err = RepoConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("shop.yml"));
    }

    #[test]
    fn missing_host_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig::load(&dir.path().join("wharf.yml")).unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn host_config_reads_reload_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wharf.yml");
        fs::write(&path, "routing:\n  reload: nginx -s reload\n").unwrap();
        let config = HostConfig::load(&path).unwrap();
        assert_eq!(config.routing.reload.as_deref(), Some("nginx -s reload"));
    }
}
