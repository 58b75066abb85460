pub mod controller;
pub mod error;
pub mod stages;

pub use controller::InterviewController;
pub use error::StageError;
pub use stages::{
    AptitudeStage, CodingStage, HRStage, SelfIntroductionStage, StageSignal, TechnicalQAStage,
};
