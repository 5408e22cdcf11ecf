use crate::config::Config;
use crate::services::seed_demo_data;
use crate::state::SharedState;

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let summary =
        seed_demo_data(state.auth_service.as_ref(), state.booking_service.as_ref()).await?;

    println!(
        "✓ Seeded {} users, {} theaters, {} shows",
        summary.users, summary.theaters, summary.shows
    );
    if summary.users > 0 {
        println!();
        println!("Demo accounts:");
        println!("  user@example.com  / secret   (USER)");
        println!("  user2@example.com / secret2  (USER)");
        println!("  user3@example.com / secret3  (MANAGER)");
    }

    Ok(())
}
