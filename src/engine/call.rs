use super::{Engine, Event};
use crate::command::call_control::types::{CallDirection, CallInfo, CallState, CallType};
use crate::parser::cursor::Cursor;

impl Engine {
    /// `+CLCC: <id>,<dir>,<stat>,<mode>,<mpty>,<number>,<type>[,<alpha>]`
    pub(crate) fn parse_clcc(&mut self, line: &[u8], send_evt: bool) -> Option<Event> {
        let mut cur = Cursor::new(line);
        if cur.peek() == b'+' {
            cur.advance(7);
        }

        let call = CallInfo {
            id: cur.read_number() as u8,
            direction: CallDirection::from(cur.read_number()),
            state: CallState::from(cur.read_number()),
            kind: CallType::from(cur.read_number()),
            multiparty: cur.read_number() != 0,
            number: cur.read_string(),
            address_type: cur.read_number() as u8,
            name: cur.read_string(),
        };

        debug!("Call {} {:?}", call.id, call.state);
        self.call = call;
        send_evt.then(|| Event::CallChanged(self.call.clone()))
    }
}
