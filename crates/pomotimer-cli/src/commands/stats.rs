use pomotimer_core::{Clock, Database, StatsTracker, SystemClock};

/// Print today's and all-time completed work sessions as JSON.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut stats = StatsTracker::new(Box::new(db));
    let record = stats.load(SystemClock.today())?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
