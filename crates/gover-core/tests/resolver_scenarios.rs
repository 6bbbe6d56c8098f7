#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use gover_core::{
    ActivationScope, ResolveError, Resolver, SessionProbe, Settings, ToolchainLayout,
};
use gover_shell::ShellType;
use tempfile::TempDir;

#[derive(Default)]
struct FakeProbe {
    executable: Option<PathBuf>,
    version: Option<String>,
}

impl SessionProbe for FakeProbe {
    fn locate(&self) -> Option<PathBuf> {
        self.executable.clone()
    }

    fn report_version(&self, _executable: &Path) -> Option<String> {
        self.version.clone()
    }
}

struct Fixture {
    temp: TempDir,
    layout: ToolchainLayout,
}

impl Fixture {
    fn new(installed: &[&str]) -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let data = temp.path().join("data");
        let layout = ToolchainLayout::new(data.join("versions"), &data.join("bin"));
        fs::create_dir_all(temp.path().join("work")).expect("create work dir");

        let fixture = Self { temp, layout };
        for version in installed {
            fixture.install(version);
        }
        fixture
    }

    fn install(&self, version: &str) {
        let bin = self.layout.bin_dir(version);
        fs::create_dir_all(&bin).expect("create bin dir");
        fs::write(self.layout.executable(version), "#!/bin/sh\n").expect("write go");
    }

    fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    fn settings_path(&self) -> PathBuf {
        self.temp.path().join("config").join("settings.json")
    }

    fn resolver(&self, probe: FakeProbe) -> Resolver {
        Resolver::new(
            Settings::load(&self.settings_path()),
            self.settings_path(),
            self.layout.clone(),
            self.work_dir(),
            ShellType::Bash,
            Box::new(probe),
        )
    }

    fn write_marker(&self, content: &str) {
        fs::write(self.work_dir().join(".go-version"), content).expect("write marker");
    }
}

fn use_quiet(
    resolver: &mut Resolver,
    token: &str,
    scope: ActivationScope,
) -> Result<(Vec<u8>, Vec<u8>), ResolveError> {
    let mut out = Vec::new();
    let mut err = Vec::new();
    resolver.use_version(token, scope, &mut out, &mut err)?;
    Ok((out, err))
}

#[test]
fn nothing_active_until_system_use() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());

    let error = resolver.current().expect_err("nothing active yet");
    assert!(matches!(error, ResolveError::NothingActive { .. }));

    let (out, _) = use_quiet(&mut resolver, "1.22.0", ActivationScope::System).expect("use system");
    assert!(out.is_empty(), "system scope prints nothing to evaluate");

    assert_eq!(resolver.current().expect("current"), "1.22.0");
    assert_eq!(resolver.current_global().expect("global"), "1.22.0");
}

#[test]
fn system_use_then_current_global_for_every_installed_version() {
    let versions = ["1.20.14", "1.21.0", "1.22.0", "1.23rc1"];
    let fixture = Fixture::new(&versions);
    let mut resolver = fixture.resolver(FakeProbe::default());

    for version in versions {
        use_quiet(&mut resolver, version, ActivationScope::System).expect("use system");
        assert_eq!(resolver.current_global().expect("global"), version);
    }

    let reloaded = fixture.resolver(FakeProbe::default());
    assert_eq!(reloaded.default_version(), Some("1.23rc1"));
}

#[test]
fn project_marker_outranks_system_link() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());
    use_quiet(&mut resolver, "1.22.0", ActivationScope::System).expect("use system");
    fixture.write_marker("1.21.0\n");

    assert_eq!(
        resolver.current_scoped().expect("current"),
        ("1.21.0".to_string(), ActivationScope::Project)
    );
}

#[test]
fn session_override_outranks_project_and_system() {
    let fixture = Fixture::new(&["1.20.14", "1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());
    use_quiet(&mut resolver, "1.22.0", ActivationScope::System).expect("use system");
    fixture.write_marker("1.21.0");

    let resolver = fixture.resolver(FakeProbe {
        executable: Some(fixture.layout.executable("1.20.14")),
        version: Some("1.20.14".to_string()),
    });

    assert_eq!(
        resolver.current_scoped().expect("current"),
        ("1.20.14".to_string(), ActivationScope::Session)
    );
}

#[test]
fn system_link_on_path_is_not_a_session_override() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());
    use_quiet(&mut resolver, "1.22.0", ActivationScope::System).expect("use system");
    fixture.write_marker("1.21.0");

    let resolver = fixture.resolver(FakeProbe {
        executable: Some(fixture.layout.link_path().to_path_buf()),
        version: Some("1.22.0".to_string()),
    });

    assert_eq!(resolver.current().expect("current"), "1.21.0");
}

#[test]
fn project_use_of_missing_version_writes_marker_but_current_fails() {
    let fixture = Fixture::new(&["1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());

    let (out, err) =
        use_quiet(&mut resolver, " 1.19.0 ", ActivationScope::Project).expect("use project");

    assert!(out.is_empty());
    assert!(String::from_utf8_lossy(&err).contains("not installed"));
    let marker = fs::read_to_string(fixture.work_dir().join(".go-version")).expect("marker");
    assert_eq!(marker.trim(), "1.19.0");

    let error = resolver.current().expect_err("missing version");
    assert!(
        matches!(error, ResolveError::MarkerVersionMissing { ref version, .. } if version == "1.19.0")
    );
}

#[test]
fn project_use_writes_through_a_symlinked_marker() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let shared = fixture.temp.path().join("shared-go-version");
    fs::write(&shared, "1.21.0\n").expect("write shared marker");
    let marker = fixture.work_dir().join(".go-version");
    std::os::unix::fs::symlink(&shared, &marker).expect("link marker");
    let mut resolver = fixture.resolver(FakeProbe::default());

    use_quiet(&mut resolver, "1.22.0", ActivationScope::Project).expect("use project");

    assert!(fs::symlink_metadata(&marker).expect("lstat").file_type().is_symlink());
    assert_eq!(fs::read_to_string(&shared).expect("read shared"), "1.22.0\n");
    assert_eq!(resolver.current().expect("current"), "1.22.0");
}

#[test]
fn empty_marker_is_reported() {
    let fixture = Fixture::new(&["1.22.0"]);
    fixture.write_marker("  \n");

    let error = fixture
        .resolver(FakeProbe::default())
        .current()
        .expect_err("empty marker");
    assert!(matches!(error, ResolveError::EmptyMarker { .. }));
}

#[test]
fn system_and_session_use_refuse_missing_versions_without_side_effects() {
    let fixture = Fixture::new(&["1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());

    for scope in [ActivationScope::System, ActivationScope::Session] {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let error = resolver
            .use_version("1.99.0", scope, &mut out, &mut err)
            .expect_err("not installed");

        assert!(matches!(error, ResolveError::NotInstalled { .. }));
        assert!(out.is_empty());
    }
    assert!(fs::symlink_metadata(fixture.layout.link_path()).is_err());
    assert!(!fixture.settings_path().exists());
}

#[test]
fn session_use_prints_path_command_on_stdout_only() {
    let fixture = Fixture::new(&["1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());

    let (out, err) = use_quiet(&mut resolver, "1.22.0", ActivationScope::Session).expect("use");

    let out = String::from_utf8(out).expect("utf8");
    assert_eq!(
        out.trim_end(),
        ShellType::Bash.path_command(&fixture.layout.bin_dir("1.22.0"))
    );
    assert!(!err.is_empty());
    assert!(fs::symlink_metadata(fixture.layout.link_path()).is_err());
}

#[test]
fn default_sentinel_uses_the_system_version() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());
    use_quiet(&mut resolver, "1.21.0", ActivationScope::System).expect("use system");

    use_quiet(&mut resolver, "default", ActivationScope::Project).expect("use default");

    let marker = fs::read_to_string(fixture.work_dir().join(".go-version")).expect("marker");
    assert_eq!(marker.trim(), "1.21.0");
}

#[test]
fn default_sentinel_without_system_version_fails() {
    let fixture = Fixture::new(&["1.21.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());

    let error = use_quiet(&mut resolver, "default", ActivationScope::Session)
        .expect_err("nothing linked");
    assert!(matches!(error, ResolveError::NothingActive { .. }));
}

#[test]
fn current_global_distinguishes_every_broken_state() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let link = fixture.layout.link_path().to_path_buf();
    fs::create_dir_all(fixture.layout.link_dir()).expect("create link dir");

    let with_default = |version: &str| {
        let settings = Settings {
            default_version: Some(version.to_string()),
            ..Settings::default()
        };
        settings.save(&fixture.settings_path()).expect("save settings");
        fixture.resolver(FakeProbe::default())
    };

    assert!(matches!(
        with_default("1.22.0").current_global(),
        Err(ResolveError::DefaultNotActivated { .. })
    ));
    assert!(matches!(
        with_default("1.30.0").current_global(),
        Err(ResolveError::DefaultNotInstalled { .. })
    ));

    fs::write(&link, "not a link").expect("write regular file");
    assert!(matches!(
        fixture.resolver(FakeProbe::default()).current_global(),
        Err(ResolveError::LinkNotSymlink { .. })
    ));
    fs::remove_file(&link).expect("remove file");

    std::os::unix::fs::symlink(fixture.layout.executable("1.25.0"), &link).expect("link");
    assert!(matches!(
        fixture.resolver(FakeProbe::default()).current_global(),
        Err(ResolveError::VersionDirMissing { .. })
    ));
    fs::remove_file(&link).expect("remove link");

    fs::remove_file(fixture.layout.executable("1.21.0")).expect("remove go");
    std::os::unix::fs::symlink(fixture.layout.executable("1.21.0"), &link).expect("link");
    assert!(matches!(
        fixture.resolver(FakeProbe::default()).current_global(),
        Err(ResolveError::ExecutableMissing { .. })
    ));
    fs::remove_file(&link).expect("remove link");

    std::os::unix::fs::symlink("/usr/local/go/bin/go", &link).expect("link");
    assert!(matches!(
        fixture.resolver(FakeProbe::default()).current_global(),
        Err(ResolveError::LinkTargetForeign { .. })
    ));
}

#[test]
fn list_installed_is_newest_first_and_skips_strays() {
    let fixture = Fixture::new(&["1.9.5", "1.22.0", "1.21rc2", "1.21.3"]);
    fs::create_dir_all(fixture.layout.versions_root().join("tmp")).expect("stray dir");
    fs::write(fixture.layout.versions_root().join("go1.30.0"), "").expect("stray file");

    let versions: Vec<String> = fixture
        .resolver(FakeProbe::default())
        .list_installed()
        .expect("list")
        .into_iter()
        .map(|installed| installed.version)
        .collect();

    assert_eq!(versions, vec!["1.22.0", "1.21.3", "1.21rc2", "1.9.5"]);
}

#[test]
fn uninstall_refuses_active_versions() {
    let fixture = Fixture::new(&["1.21.0", "1.22.0"]);
    let mut resolver = fixture.resolver(FakeProbe::default());
    use_quiet(&mut resolver, "1.22.0", ActivationScope::System).expect("use system");

    let error = resolver.uninstall("1.22.0").expect_err("active");
    assert!(matches!(error, ResolveError::VersionActive { .. }));

    let error = resolver.uninstall("1.99.0").expect_err("missing");
    assert!(matches!(error, ResolveError::NotInstalled { .. }));

    resolver.uninstall("1.21.0").expect("uninstall inactive");
    assert!(!resolver.is_installed("1.21.0"));
}

#[test]
fn ensure_default_linked_recreates_link() {
    let fixture = Fixture::new(&["1.22.0"]);
    let settings = Settings {
        default_version: Some("1.22.0".to_string()),
        ..Settings::default()
    };
    settings.save(&fixture.settings_path()).expect("save settings");
    let resolver = fixture.resolver(FakeProbe::default());

    assert_eq!(
        resolver.ensure_default_linked().expect("link"),
        Some("1.22.0".to_string())
    );
    assert_eq!(resolver.current_global().expect("global"), "1.22.0");
}
