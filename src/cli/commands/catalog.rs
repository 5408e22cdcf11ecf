use crate::config::Config;
use crate::constants::SHOW_DATE_FORMAT;
use crate::state::SharedState;

pub async fn cmd_list_theaters(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let theaters = state.booking_service.list_theaters().await?;

    if theaters.is_empty() {
        println!("No theaters.");
        println!();
        println!("Add demo data with: marquee seed");
        return Ok(());
    }

    println!("Theaters ({} total)", theaters.len());
    println!("{:-<60}", "");

    for theater in theaters {
        println!(
            "[{}] {} ({} seats)",
            theater.id, theater.name, theater.capacity
        );
    }

    Ok(())
}

pub async fn cmd_list_shows(config: &Config, theater_id: Option<i32>) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let shows = state.booking_service.list_show_details(theater_id).await?;

    if shows.is_empty() {
        println!("No shows.");
        return Ok(());
    }

    println!("Shows ({} total)", shows.len());
    println!("{:-<70}", "");

    for show in shows {
        let status = if show.is_full() { "FULL" } else { "open" };
        println!("[{}] {} @ {}", show.id, show.name, show.theater_name);
        println!(
            "  {} | {}/{} booked | {} left | {}",
            show.date.format(SHOW_DATE_FORMAT),
            show.booked,
            show.capacity,
            show.available,
            status
        );
    }

    Ok(())
}
