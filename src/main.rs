use anyhow::Result;
use mdm_launcher::archive::ZipExtractor;
use mdm_launcher::launch;
use mdm_launcher::payload::{self, PayloadLocation};
use mdm_launcher::platform::{self, HostDescriptor, PlatformKey};
use mdm_launcher::provision::provision;
use mdm_launcher::runtime::RealRuntime;
use std::ffi::OsString;

/// Enables verbose diagnostic output when the launcher itself fails
const DEBUG_ENV: &str = "MCP_DEV_MANAGER_DEBUG";

/// mdm-launcher - platform-resolving launcher for mcp-dev-manager
///
/// Resolves the host OS and CPU architecture to one of the shipped payload
/// platforms, unpacks dist/<platform>/mcp-dev-manager.zip next to itself,
/// and runs the extracted binary with every argument, stream, signal, and
/// the final exit code passed through untouched. It takes no flags of its
/// own: the whole argument vector belongs to the child.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            if std::env::var_os(DEBUG_ENV).is_some() {
                eprintln!("{:?}", err);
            }
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let runtime = RealRuntime;

    let host = HostDescriptor::detect();
    let key = match platform::resolve(&runtime, &host) {
        Ok(key) => key,
        Err(unsupported) => {
            eprintln!("{}", unsupported);
            eprintln!("Supported platforms:");
            for key in PlatformKey::ALL {
                eprintln!("  - {}", key.label());
            }
            return Ok(1);
        }
    };

    let root = payload::install_root(&runtime)?;
    let location = PayloadLocation::for_key(&root, key);
    provision(&runtime, &ZipExtractor, &location, key)?;

    println!("   launching {}", location.executable_name);

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let child = launch::spawn(&location.executable_path, args)?;
    launch::supervise(child).await
}
