//! Blog permissions demo
//!
//! Run with `RUST_LOG=cretoai_acl=debug cargo run -p cretoai-acl --example blog`
//! to see every rule the resolver inspects.

use cretoai_acl::{assertion, Acl, AssertionOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let acl = Acl::new();

    // guest <- member <- editor <- admin
    acl.add_role("member", Some("guest"))?;
    acl.add_role("editor", Some("member"))?;
    acl.add_role("admin", Some("editor"))?;

    // site <- blog <- post, site <- settings
    acl.add_resource("blog", Some("site"))?;
    acl.add_resource("post", Some("blog"))?;
    acl.add_resource("settings", Some("site"))?;

    acl.allow(Some("guest"), Some("blog"));
    acl.deny(None, Some("settings"));
    acl.allow(Some("admin"), None);
    acl.allow_with(
        Some("editor"),
        Some("post"),
        assertion::from_fn(|role, _| {
            info!("Checking editorial freeze for {:?}", role);
            Ok(AssertionOutcome::Defer)
        }),
    );

    let queries = [
        ("guest", "post"),
        ("member", "settings"),
        ("editor", "post"),
        ("admin", "settings"),
        ("visitor", "blog"),
    ];

    for (role, resource) in queries {
        let decision = acl.check(Some(role), Some(resource)).await?;
        info!(
            "{:>8} -> {:<9} {} ({:?})",
            role,
            resource,
            if decision.allowed { "ALLOW" } else { "DENY" },
            decision.reason
        );
    }

    if let Some(metrics) = acl.metrics() {
        info!(
            "{} checks, allow rate {:.2}",
            metrics.total_checks,
            metrics.allow_rate()
        );
    }

    Ok(())
}
