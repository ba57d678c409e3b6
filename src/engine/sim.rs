use super::{Engine, Event, FollowUp};
use crate::command::device_lock::types::SimState;
use crate::parser::cursor::Cursor;

impl Engine {
    /// `+CPIN: <code>`
    pub(crate) fn parse_cpin(&mut self, line: &[u8], send_evt: bool) -> Option<Event> {
        let mut cur = Cursor::new(line);
        if cur.peek() == b'+' {
            cur.advance(7);
        }

        let state = SimState::from_code(cur.remaining());
        if state == self.sim.state {
            return None;
        }

        debug!("SIM state {:?}", state);
        self.sim.state = state;
        if state == SimState::Ready {
            self.push_follow_up(FollowUp::QuerySimInfo);
        }

        send_evt.then_some(Event::SimStateChanged(state))
    }

    /// `+CCID: <ICCID>`
    pub(crate) fn parse_ccid(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        cur.advance(7);
        self.sim.iccid = cur.read_string();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::engine;
    use super::super::{CommandKind, Output};
    use super::*;

    #[test]
    fn cpin_literals() {
        assert_eq!(SimState::from_code(b"READY"), SimState::Ready);
        assert_eq!(SimState::from_code(b"NOT READY"), SimState::NotReady);
        assert_eq!(SimState::from_code(b"NOT INSERTED"), SimState::NotInserted);
        assert_eq!(SimState::from_code(b"SIM PIN"), SimState::PinRequired);
        assert_eq!(SimState::from_code(b"SIM PUK"), SimState::PukRequired);
        assert_eq!(SimState::from_code(b"PH-SIM PIN"), SimState::NotReady);
    }

    #[test]
    fn cpin_event_only_on_change() {
        let mut engine = engine();
        assert_eq!(
            engine.process_line(b"+CPIN: SIM PIN"),
            Some(Event::SimStateChanged(SimState::PinRequired))
        );
        assert_eq!(engine.process_line(b"+CPIN: SIM PIN"), None);
        assert_eq!(engine.pop_follow_up(), None);

        assert_eq!(
            engine.process_line(b"+CPIN: READY"),
            Some(Event::SimStateChanged(SimState::Ready))
        );
        assert_eq!(engine.pop_follow_up(), Some(FollowUp::QuerySimInfo));
    }

    #[test]
    fn cpin_without_event() {
        let mut engine = engine();
        assert_eq!(engine.parse_cpin(b"+CPIN: READY", false), None);
        assert_eq!(engine.sim().state, SimState::Ready);
    }

    #[test]
    fn ccid() {
        let mut engine = engine();
        engine.begin(CommandKind::SimInfo).unwrap();
        engine.process_line(b"+CCID: 89460123456789012345");
        engine.process_line(b"OK");
        assert_eq!(
            engine.take_completion(),
            Some(Ok(Output::Iccid("89460123456789012345".try_into().unwrap())))
        );
    }
}
