//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::Utc;

use crate::app::auth_service::hash_password;
use crate::domain::entities::{Aircraft, AircraftId, Role, User, UserId};

/// Header row of a tracker export
pub const CSV_HEADER: &str = "Item Code,Position,Description,Type,Interval Months,\
Interval Hours,Interval Landings,Adjusted Interval,Part Number,Part Serial,\
Last Completed Date,Last Completed Hours,Last Completed Landings,Last Completed City,\
Due Next Date,Due Next Hours,Due Next Landings,Time Remaining,Hours Remaining,\
Landings Remaining,Status,Status Note";

/// Password of every fixture user
pub const TEST_PASSWORD: &str = "test-password";

/// Create a test aircraft with the given ID
pub fn test_aircraft(id: i64) -> Aircraft {
    Aircraft {
        id: AircraftId(id),
        name: format!("EC-T{:02}", id),
        model: "A320".to_string(),
        created_at: Utc::now(),
    }
}

/// Create a test user named after its role, with [`TEST_PASSWORD`]
pub fn test_user(id: i64, role: Role) -> User {
    let salt = format!("salt-{}", id);
    User {
        id: UserId(id),
        username: role.to_string(),
        role,
        created_at: Utc::now(),
        password_hash: hash_password(&salt, TEST_PASSWORD),
        password_salt: salt,
    }
}

/// One valid data row of type `insp`; an empty description leaves it absent
pub fn item_row(item_code: &str, description: &str) -> String {
    format!(
        "{item_code},LH,{description},insp,12,600,,,PN-1,SN-1,2024-01-15,1000,500,MAD,\
         2025-01-15,1600,,6m 3d,600,,OK,"
    )
}

/// A complete CSV file with the given data rows
pub fn csv_upload(rows: &[String]) -> Vec<u8> {
    let mut content = String::from(CSV_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    content.into_bytes()
}
