use raycast_core::{process, Auth, Config, CredentialStore, Paths};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let paths = Paths::new();

    println!("=== Paths ===");
    println!("config: {}", paths.config_file().display());
    println!("credentials: {}", config.credentials_path().display());
    println!("history: {}", paths.history_dir().display());

    println!("\n=== Process Checks ===");
    println!("{}: {}", config.app_name, process::is_running(&config.app_name));

    println!("\n=== Credentials ===");
    let store = CredentialStore::load(&config.credentials_path())?;
    println!("{}", store.audit_all());

    Ok(())
}
