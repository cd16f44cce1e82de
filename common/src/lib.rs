//! Types shared by the form server and the sender: the configuration record
//! handed between them, run outcomes, form API payloads and the spreadsheet
//! reader both sides use.

pub mod jobs;
pub mod model;
pub mod requests;
pub mod sheet;
