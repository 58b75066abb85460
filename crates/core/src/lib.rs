pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod profile;
pub mod question;
pub mod results;
pub mod session;
pub mod stage;

pub use config::Config;
pub use error::*;
pub use events::{Countdown, CountdownState, StageEvent};
pub use feedback::*;
pub use profile::{ProfileKind, ResolvedProfile, SelectionProfile};
pub use question::*;
pub use results::{ReportRecord, ResultsAggregate};
pub use session::{InterviewSession, StageResult};
pub use stage::{Stage, StageKey};
