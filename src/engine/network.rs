use super::{CommandKind, Engine, Event, FollowUp, Output};
use crate::command::network_service::types::{
    Operator, OperatorFormat, OperatorMode, OperatorName,
};
use crate::parser::cursor::Cursor;
use crate::registration::RegistrationStatus;

impl Engine {
    /// `+CREG: [<n>,]<stat>`. The `<n>` field is only present in the answer
    /// to `+CREG?`, not in the URC.
    pub(crate) fn parse_creg(&mut self, line: &[u8], skip_first: bool) -> Option<Event> {
        let mut cur = Cursor::new(line);
        if cur.peek() == b'+' {
            cur.advance(7);
        }
        if skip_first {
            cur.read_number();
        }

        let status = RegistrationStatus::from(cur.read_number());
        debug!("Registration status {:?}", status);
        self.network.status = status;

        if status.is_registered() {
            self.push_follow_up(FollowUp::QueryOperator);
        } else if self.network.is_attached {
            self.push_follow_up(FollowUp::QueryNetworkStatus);
        }

        Some(Event::NetworkRegChanged(status))
    }

    /// `+CSQ: <rssi>,<qual>`
    pub(crate) fn parse_csq(&mut self, line: &[u8]) -> Option<Event> {
        let mut cur = Cursor::new(line);
        if cur.peek() == b'+' {
            cur.advance(6);
        }

        let rssi = rssi_to_dbm(cur.read_number());
        self.network.rssi = rssi;
        if self.active_command() == Some(CommandKind::SignalQuality) {
            self.output = Output::SignalQuality(rssi);
        }

        Some(Event::SignalStrength(rssi))
    }

    /// `+COPS: <mode>[,<format>,<oper>]`
    pub(crate) fn parse_cops(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        if cur.peek() == b'+' {
            cur.advance(7);
        }

        let mut op = Operator {
            mode: OperatorMode::from(cur.read_number()),
            format: OperatorFormat::Invalid,
            name: OperatorName::None,
        };

        if !cur.is_at_end() {
            op.format = OperatorFormat::from(cur.read_number());
            if !cur.is_at_end() {
                op.name = match op.format {
                    OperatorFormat::LongName => OperatorName::LongName(cur.read_string()),
                    OperatorFormat::ShortName => OperatorName::ShortName(cur.read_string()),
                    OperatorFormat::Numeric => OperatorName::Numeric(cur.read_number() as u32),
                    OperatorFormat::Invalid => OperatorName::None,
                };
            }
        }

        debug!("Operator {:?}", op);
        if self.active_command() == Some(CommandKind::OperatorGet) {
            self.output = Output::Operator(op.clone());
        }
        self.network.operator = op;
    }
}

/// Map a raw `<rssi>` to dBm. 99 and other values above the scale are `0`.
pub fn rssi_to_dbm(raw: i32) -> i16 {
    if raw < 32 {
        // Lower values are below the scale and read as its floor.
        -(113 - 2 * raw.max(0) as i16)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::engine;
    use super::*;

    #[test]
    fn signal_quality_mapping() {
        assert_eq!(rssi_to_dbm(0), -113);
        assert_eq!(rssi_to_dbm(31), -51);
        assert_eq!(rssi_to_dbm(99), 0);
        assert_eq!(rssi_to_dbm(32), 0);
        assert_eq!(rssi_to_dbm(i32::MAX), 0);
        assert_eq!(rssi_to_dbm(-1), -113);
        assert_eq!(rssi_to_dbm(i32::MIN), -113);
    }

    #[test]
    fn csq_fills_output_only_for_signal_query() {
        let mut engine = engine();
        assert_eq!(
            engine.process_line(b"+CSQ: 20,99"),
            Some(Event::SignalStrength(-73))
        );
        assert_eq!(engine.network().rssi, -73);

        engine.begin(CommandKind::SignalQuality).unwrap();
        assert_eq!(
            engine.process_line(b"+CSQ: 99,99"),
            Some(Event::SignalStrength(0))
        );
        engine.process_line(b"OK");
        assert_eq!(engine.take_completion(), Some(Ok(Output::SignalQuality(0))));
    }

    #[test]
    fn creg_urc_and_query_forms() {
        let mut engine = engine();
        assert_eq!(
            engine.process_line(b"+CREG: 2"),
            Some(Event::NetworkRegChanged(RegistrationStatus::Searching))
        );
        assert_eq!(engine.pop_follow_up(), None);

        engine.begin(CommandKind::NetworkRegistration).unwrap();
        assert_eq!(
            engine.process_line(b"+CREG: 0,5"),
            Some(Event::NetworkRegChanged(RegistrationStatus::Roaming))
        );
        engine.process_line(b"OK");
        assert_eq!(
            engine.take_completion(),
            Some(Ok(Output::Registration(RegistrationStatus::Roaming)))
        );
        assert_eq!(engine.pop_follow_up(), Some(FollowUp::QueryOperator));
    }

    #[test]
    fn creg_event_fires_without_change() {
        let mut engine = engine();
        let ev = Some(Event::NetworkRegChanged(RegistrationStatus::Home));
        assert_eq!(engine.process_line(b"+CREG: 1"), ev);
        assert_eq!(engine.process_line(b"+CREG: 1"), ev);
    }

    #[test]
    fn creg_loss_while_attached_refreshes_network_status() {
        let mut engine = engine();
        engine.network.is_attached = true;
        engine.process_line(b"+CREG: 0");
        assert_eq!(engine.pop_follow_up(), Some(FollowUp::QueryNetworkStatus));
    }

    #[test]
    fn cops_formats() {
        let mut engine = engine();
        engine.process_line(b"+COPS: 0,0,\"Telia SE\",7");
        assert_eq!(engine.network().operator.format, OperatorFormat::LongName);
        assert_eq!(
            engine.network().operator.name,
            OperatorName::LongName("Telia SE".try_into().unwrap())
        );

        engine.process_line(b"+COPS: 1,2,\"24001\"");
        assert_eq!(engine.network().operator.mode, OperatorMode::Manual);
        assert_eq!(engine.network().operator.name, OperatorName::Numeric(24001));

        engine.process_line(b"+COPS: 0");
        assert_eq!(engine.network().operator.format, OperatorFormat::Invalid);
        assert_eq!(engine.network().operator.name, OperatorName::None);
    }

    #[test]
    fn cops_query_output() {
        let mut engine = engine();
        engine.begin(CommandKind::OperatorGet).unwrap();
        engine.process_line(b"+COPS: 0,1,\"Tele2\"");
        engine.process_line(b"OK");

        let Some(Ok(Output::Operator(op))) = engine.take_completion() else {
            panic!("no operator");
        };
        assert_eq!(op.format, OperatorFormat::ShortName);
        assert_eq!(op.name, OperatorName::ShortName("Tele2".try_into().unwrap()));
    }

    #[test]
    fn cops_scan_line() {
        let mut engine = engine();
        engine.begin(CommandKind::OperatorScan).unwrap();
        engine.process_line(b"+COPS: (1,\"Operator A\",\"OpA\",310260),,(0,1),(0,2)");
        engine.process_line(b"OK");

        let Some(Ok(Output::Operators(ops))) = engine.take_completion() else {
            panic!("no scan result");
        };
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].numeric, 310260);
        assert_eq!(ops[0].long_name.as_str(), "Operator A");
    }
}
