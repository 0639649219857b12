use bprov::cli::{Cli, Commands, GlobalOpts};
use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Boards(args) => bprov::cli::commands::boards::run(args, &global),
        Commands::Users(args) => bprov::cli::commands::users::run(args, &global),
        Commands::Invite(args) => bprov::cli::commands::invite::run(args, &global),
        Commands::Config(cmd) => bprov::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => bprov::cli::commands::completions::run(args),
    }
}

/// Diagnostic logs go to stderr; BPROV_LOG takes precedence over -v / -q
fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("BPROV_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("bprov={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
