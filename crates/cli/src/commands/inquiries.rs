//! Inquiry maintenance commands.

use std::sync::Arc;
use std::time::Duration;

use ucpl_site::db::PgInquiryRepository;
use ucpl_site::services::InquiryService;

use super::{CommandError, connect};

/// Set status `new` on every inquiry stored without one.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the update fails.
pub async fn fix_status() -> Result<(), CommandError> {
    let pool = connect().await?;
    let service = InquiryService::new(
        Arc::new(PgInquiryRepository::new(pool)),
        None,
        Duration::from_secs(10),
    );

    let updated = service.backfill_missing_status().await?;
    tracing::info!(updated, "Inquiry status backfill complete");

    #[allow(clippy::print_stdout)]
    {
        println!("Updated {updated} inquiries with missing status.");
    }
    Ok(())
}
