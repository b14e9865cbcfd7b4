use super::*;
use crate::config::GameConfig;


/// Seeded headless session with the pipes removed.
pub(crate) fn open_sky(seed: u64) -> Session {
    let mut session = Session::seeded(GameConfig::headless(), seed).unwrap();
    session.state_mut().pipes.clear();
    session
}

#[test]
fn test_session_reports_built_in_sprite_sizes() {
    let session = open_sky(0);
    assert_eq!(session.masks().player_width(), 34);
    assert_eq!(session.masks().pipe_height(), 320);
    assert!(session.state().pipes.is_empty());
}
