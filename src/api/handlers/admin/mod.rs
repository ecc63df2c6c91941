//! Admin-only account administration: staff lifecycle (with the last-admin
//! guard), student moderation, and headline stats.

mod bootstrap;
pub(crate) mod staff;
pub(crate) mod stats;
pub(crate) mod storage;
pub(crate) mod students;
pub(crate) mod types;

pub(crate) use bootstrap::bootstrap_admin;
pub(crate) use staff::{staff_create, staff_list, staff_remove, staff_update};
pub(crate) use stats::stats;
pub(crate) use students::{student_ban, student_delete, students_list};
