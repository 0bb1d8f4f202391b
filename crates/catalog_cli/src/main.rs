//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `catalog_core` linkage.
//! - Open the configured catalog and print the admin registrations.
//! - Keep output deterministic for quick local sanity checks.

use catalog_core::admin::filter_options;
use catalog_core::{catalog_registrations, AdminSite, CatalogConfig};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("catalog_core ping={}", catalog_core::ping());
    println!("catalog_core version={}", catalog_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("catalog_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;
    let logging = config.init_logging()?;
    println!("logging={}", if logging { "file" } else { "off" });

    let conn = config.open_connection()?;
    let schema_version = catalog_core::db::migrations::schema_version(&conn)?;
    println!("schema_version={schema_version}");

    let site = AdminSite::new(catalog_registrations())?;
    for admin in site.registrations() {
        println!(
            "admin entity={} list_display={} list_filter={}",
            admin.entity,
            admin.list_display.join(","),
            admin.list_filter.join(",")
        );
        for filter in filter_options(admin) {
            let labels: Vec<&str> = filter.options.iter().map(|option| option.label).collect();
            println!("  filter {}: {}", filter.field, labels.join(" | "));
        }
    }

    info!(
        "event=cli_run module=cli status=ok schema_version={schema_version} registrations={}",
        site.registrations().count()
    );
    Ok(())
}
