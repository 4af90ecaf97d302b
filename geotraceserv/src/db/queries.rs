// Query functions for the submissions table
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;

use crate::db::{ClearOutcome, DbPool, NewSubmission, Submission, schema::*};

pub fn insert_submission(db: &DbPool, submission: &NewSubmission) -> Result<(), Box<dyn std::error::Error>> {
    use diesel::insert_into;

    let mut conn = db.lock().map_err(|_| "database lock poisoned")?;
    insert_into(submissions::table)
        .values(submission)
        .execute(&mut *conn)?;

    Ok(())
}

/// Most recent submissions first, at most `limit` rows
pub fn list_submissions(db: &DbPool, limit: i64) -> Result<Vec<Submission>, Box<dyn std::error::Error>> {
    let mut conn = db.lock().map_err(|_| "database lock poisoned")?;
    let results = submissions::table
        .select(Submission::as_select())
        .order_by(submissions::id.desc())
        .limit(limit)
        .load::<Submission>(&mut *conn)?;

    Ok(results)
}

/// Delete every submission, then try to give the space back to the filesystem
pub fn clear_submissions(db: &DbPool) -> Result<ClearOutcome, Box<dyn std::error::Error>> {
    let mut conn = db.lock().map_err(|_| "database lock poisoned")?;
    delete_all_and_reclaim(&mut conn)
}

fn delete_all_and_reclaim(conn: &mut SqliteConnection) -> Result<ClearOutcome, Box<dyn std::error::Error>> {
    let deleted = diesel::delete(submissions::table).execute(conn)?;

    // VACUUM is best-effort: the delete above already committed
    let reclaimed = match sql_query("VACUUM").execute(conn) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("VACUUM after clear failed: {:?}", e);
            false
        }
    };

    Ok(ClearOutcome { deleted, reclaimed })
}
