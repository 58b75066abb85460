pub mod aptitude;
pub mod coding;
pub mod hr;
pub mod self_intro;
pub mod technical;

pub use aptitude::AptitudeStage;
pub use coding::CodingStage;
pub use hr::HRStage;
pub use self_intro::SelfIntroductionStage;
pub use technical::TechnicalQAStage;

/// What the front end should do after feeding a stage an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSignal {
    Continue,
    /// The stage is done collecting input (last question answered or time ran out).
    Submit,
}

/// Append a final speech transcript to typed text, separated by one space.
pub(crate) fn append_transcript(buffer: &mut String, transcript: &str) {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return;
    }
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(transcript);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcripts_join_with_single_space() {
        let mut s = String::new();
        append_transcript(&mut s, " hello ");
        append_transcript(&mut s, "world");
        append_transcript(&mut s, "   ");
        assert_eq!(s, "hello world");

        let mut typed = String::from("typed ");
        append_transcript(&mut typed, "spoken");
        assert_eq!(typed, "typed spoken");
    }
}
