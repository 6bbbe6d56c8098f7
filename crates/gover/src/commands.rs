use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use gover_backend::{Catalog, InstalledVersion};
use gover_core::{ActivationScope, GoDevCatalog, PathProbe, Resolver, Settings, ToolchainLayout};
use gover_platform::AppPaths;
use gover_shell::{ShellType, VerificationResult};
use log::{debug, info, warn};

use crate::cli::{Cli, Command, DeinitArgs, InitArgs, ListRemoteArgs, UseArgs};
use crate::error::AppError;
use crate::logging;
use crate::state_lock::StateLock;

/// Everything a command needs, resolved once at startup.
struct Context {
    paths: AppPaths,
    settings: Settings,
    layout: ToolchainLayout,
    /// Why the settings file was ignored. Held until the logger is up.
    settings_warning: Option<String>,
}

impl Context {
    fn load() -> Result<Self, AppError> {
        let base = AppPaths::new()?;
        let (settings, settings_warning) = load_settings(&base.settings_file());
        let paths = base.with_data_dir_fallback(settings.data_dir.clone());
        let layout = ToolchainLayout::new(paths.versions_dir(), &paths.bin_dir());
        Ok(Self {
            paths,
            settings,
            layout,
            settings_warning,
        })
    }

    fn resolver(&self, shell: ShellType) -> Result<Resolver, AppError> {
        let work_dir =
            std::env::current_dir().map_err(|e| AppError::io("failed to read working directory", e))?;
        Ok(Resolver::new(
            self.settings.clone(),
            self.paths.settings_file(),
            self.layout.clone(),
            work_dir,
            shell,
            Box::new(PathProbe),
        ))
    }

    fn lock(&self) -> Result<StateLock, AppError> {
        Ok(StateLock::acquire(&self.paths.lock_file())?)
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let context = Context::load()?;
    logging::init_logging(
        &context.paths.log_file(),
        context.settings.debug_logging,
        cli.verbose,
        context.settings.max_log_size_bytes,
    );
    if let Some(message) = &context.settings_warning {
        warn!("{message}");
    }
    debug!("Running {:?} with data dir {}", cli.command, context.paths.data_dir.display());

    match cli.command {
        Command::Current => current(&context),
        Command::Use(args) => use_version(&context, &args),
        Command::Init(args) => init(&context, &args),
        Command::Deinit(args) => deinit(&context, &args),
        Command::List => list(&context),
        Command::ListRemote(args) => list_remote(&context, &args).await,
        Command::Uninstall(args) => {
            let _lock = context.lock()?;
            context.resolver(ShellType::detect())?.uninstall(&args.version)?;
            eprintln!("gover: uninstalled {}", args.version);
            Ok(())
        }
    }
}

fn load_settings(path: &Path) -> (Settings, Option<String>) {
    match Settings::try_load(path) {
        Ok(settings) => (settings, None),
        Err(error) => (
            Settings::default(),
            Some(format!(
                "Ignoring malformed settings file {}: {error}",
                path.display()
            )),
        ),
    }
}

fn current(context: &Context) -> Result<(), AppError> {
    let (version, scope) = context.resolver(ShellType::detect())?.current_scoped()?;
    debug!("{version} is active via {} scope", scope.as_str());
    println!("{version}");
    Ok(())
}

fn use_version(context: &Context, args: &UseArgs) -> Result<(), AppError> {
    let scope = args.scope();
    let _lock = match scope {
        ActivationScope::Session => None,
        _ => Some(context.lock()?),
    };

    let mut resolver = context.resolver(ShellType::detect())?;
    let stdout = io::stdout();
    let stderr = io::stderr();
    resolver.use_version(&args.version, scope, &mut stdout.lock(), &mut stderr.lock())?;
    Ok(())
}

fn init(context: &Context, args: &InitArgs) -> Result<(), AppError> {
    let shell = args.shell.unwrap_or_else(ShellType::detect);
    let bin_dir = context.paths.bin_dir();

    if args.check {
        return match gover_shell::verify_shell_config(shell, &bin_dir) {
            VerificationResult::Configured => {
                println!("{} integration is installed", shell.display_name());
                Ok(())
            }
            other => Err(AppError::NotConfigured {
                shell,
                name: shell.name(),
                detail: describe_verification(&other),
            }),
        };
    }

    let _lock = context.lock()?;
    std::fs::create_dir_all(&bin_dir)
        .map_err(|e| AppError::io("failed to create the managed bin directory", e))?;

    let outcome = gover_shell::initialize(shell, &bin_dir, args.force)?;
    let verb = if outcome.replaced { "updated" } else { "added" };
    eprintln!(
        "gover: {verb} {} integration in {}",
        shell.display_name(),
        outcome.path.display()
    );

    if let Some(version) = context.resolver(shell)?.ensure_default_linked()? {
        eprintln!("gover: linked default version {version}");
    }
    eprintln!("gover: open a new {} session to pick up the change", shell.display_name());
    Ok(())
}

fn deinit(context: &Context, args: &DeinitArgs) -> Result<(), AppError> {
    let shell = args.shell.unwrap_or_else(ShellType::detect);
    let _lock = context.lock()?;

    match gover_shell::deinitialize(shell, &context.paths.bin_dir())? {
        Some(path) => eprintln!(
            "gover: removed {} integration from {}",
            shell.display_name(),
            path.display()
        ),
        None => eprintln!("gover: no {} integration found", shell.display_name()),
    }
    Ok(())
}

fn list(context: &Context) -> Result<(), AppError> {
    let resolver = context.resolver(ShellType::detect())?;
    let installed = resolver.list_installed()?;
    if installed.is_empty() {
        eprintln!("gover: no versions installed in {}", context.layout.versions_root().display());
        return Ok(());
    }

    let active = resolver.current().ok();
    let mut stdout = io::stdout().lock();
    for entry in &installed {
        let is_active = active.as_deref() == Some(entry.version.as_str());
        writeln!(stdout, "{}", format_installed(entry, is_active))
            .map_err(|e| AppError::io("failed to write output", e))?;
    }
    Ok(())
}

async fn list_remote(context: &Context, args: &ListRemoteArgs) -> Result<(), AppError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(context.settings.http_timeout_secs))
        .build()
        .map_err(AppError::HttpClient)?;
    let catalog = GoDevCatalog::new(client, &context.settings.catalog_url);

    let versions = catalog.list_remote(args.all).await?;
    info!("Catalog returned {} versions", versions.len());

    let resolver = context.resolver(ShellType::detect())?;
    let mut stdout = io::stdout().lock();
    for version in versions {
        let suffix = if resolver.is_installed(&version) {
            " (installed)"
        } else {
            ""
        };
        writeln!(stdout, "{version}{suffix}")
            .map_err(|e| AppError::io("failed to write output", e))?;
    }
    Ok(())
}

fn format_installed(entry: &InstalledVersion, is_active: bool) -> String {
    let marker = if is_active { '*' } else { ' ' };
    let date = entry
        .installed_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{marker} {:<12} {:>9}  {date}",
        entry.version,
        format_size(entry.disk_size)
    )
    .trim_end()
    .to_string()
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn describe_verification(result: &VerificationResult) -> String {
    match result {
        VerificationResult::Configured => "configured".to_string(),
        VerificationResult::NotConfigured => "no gover block in the startup file".to_string(),
        VerificationResult::ConfigFileNotFound => "the startup file does not exist".to_string(),
        VerificationResult::Unsupported => "this shell is not supported on this platform".to_string(),
        VerificationResult::Error(message) => message.clone(),
    }
}
