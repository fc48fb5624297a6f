use crate::{
    error::AppError::{self, InvalidInput},
    evaluator::Submission,
    routes::ScorePayload,
};

pub const MAX_SESSION_ID_LEN: usize = 128;

pub fn validate_session_id(session_id: &str) -> Result<&str, AppError> {
    let session_id = session_id.trim();

    if session_id.is_empty() {
        return Err(InvalidInput("Session ID required"));
    }

    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(InvalidInput("Session ID too long"));
    }

    Ok(session_id)
}

/// Boundary checks before any store access. Scores and play times are
/// signed on the wire so a negative value is a clean 400, not a decode
/// error.
pub fn parse_submission(payload: &ScorePayload) -> Result<Submission, AppError> {
    let score = u32::try_from(payload.score).map_err(|_| InvalidInput("Invalid score"))?;

    let play_time =
        u32::try_from(payload.play_time).map_err(|_| InvalidInput("Invalid play time"))?;

    let perfect_matches = payload
        .perfect_matches
        .map(|count| u32::try_from(count).map_err(|_| InvalidInput("Invalid perfect match count")))
        .transpose()?;

    Ok(Submission {
        score,
        play_time,
        perfect_matches,
    })
}
