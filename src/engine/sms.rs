use super::{CommandKind, Engine, Event, Output, StorageQuery};
use crate::command::sms::types::{SmsEntry, SmsStatus, StorageSlot};
use crate::command::types::MemoryInfo;
use crate::fmt::LossyStr;
use crate::parser::cursor::Cursor;

impl Engine {
    pub fn sms_storage(&self, slot: StorageSlot) -> &MemoryInfo {
        &self.sms_storage[slot as usize]
    }

    /// `+CMGS: <mr>`
    pub(crate) fn parse_cmgs(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        cur.advance(7);
        let reference = cur.read_number();
        if self.active_command() == Some(CommandKind::SmsSend) {
            self.output = Output::SmsReference(reference);
        }
    }

    /// `+CMGR: <stat>,<oa>,[<alpha>],<scts>`, followed by the text line.
    pub(crate) fn parse_cmgr(&mut self, line: &[u8]) {
        let Some(CommandKind::SmsRead { pos }) = self.active_command() else {
            return;
        };
        let mut cur = Cursor::new(line);
        cur.advance(7);

        let mut entry = SmsEntry {
            mem: self.sms_storage[StorageSlot::Operate as usize].current,
            pos,
            ..SmsEntry::default()
        };
        read_sms_header(&mut cur, &mut entry);
        self.sms_body = Some(entry);
    }

    /// `+CMGL: <index>,<stat>,<oa>,[<alpha>],[<scts>]`, followed by the text
    /// line. Entries beyond the list capacity are parsed along with their
    /// text and then dropped.
    pub(crate) fn parse_cmgl(&mut self, line: &[u8]) {
        if !matches!(self.output, Output::SmsList(_)) {
            return;
        }
        let mut cur = Cursor::new(line);
        cur.advance(7);

        let mut entry = SmsEntry {
            mem: self.sms_storage[StorageSlot::Operate as usize].current,
            pos: cur.read_number() as usize,
            ..SmsEntry::default()
        };
        read_sms_header(&mut cur, &mut entry);
        self.sms_body = Some(entry);
    }

    pub(crate) fn store_sms_body(&mut self, mut entry: SmsEntry, line: &[u8]) {
        trace!("SMS text {:?}", LossyStr(line));
        entry.data.clear();
        for &c in line {
            if entry.data.push(c as char).is_err() {
                break;
            }
        }
        self.store_sms_entry(entry);
    }

    pub(crate) fn store_sms_entry(&mut self, entry: SmsEntry) {
        match &mut self.output {
            Output::SmsList(list) => {
                if let Err(entry) = list.push(entry) {
                    debug!("SMS list full, dropping entry {}", entry.pos);
                }
            }
            out => *out = Output::Sms(entry),
        }
    }

    /// `+CMTI: <mem>,<index>`
    pub(crate) fn parse_cmti(&mut self, line: &[u8]) -> Option<Event> {
        let mut cur = Cursor::new(line);
        cur.advance(7);
        let mem = cur.read_memory();
        let pos = cur.read_number() as usize;
        debug!("New SMS in {:?} at {}", mem, pos);
        Some(Event::SmsReceived { mem, pos })
    }

    /// `+CPMS` in one of its three shapes.
    pub(crate) fn parse_cpms(&mut self, line: &[u8], query: StorageQuery) {
        let mut cur = Cursor::new(line);
        cur.advance(7);

        for info in self.sms_storage.iter_mut() {
            match query {
                StorageQuery::Options => info.available = cur.read_memories(),
                StorageQuery::Current => {
                    info.current = cur.read_memory();
                    info.used = cur.read_number() as usize;
                    info.total = cur.read_number() as usize;
                }
                StorageQuery::Set => {
                    info.used = cur.read_number() as usize;
                    info.total = cur.read_number() as usize;
                }
            }
        }
    }
}

fn read_sms_header(cur: &mut Cursor<'_>, entry: &mut SmsEntry) {
    let status: heapless::String<12> = cur.read_string();
    entry.status = SmsStatus::from_text(&status);
    entry.number = cur.read_string();
    entry.name = cur.read_string();
    entry.datetime = cur.read_datetime();
}
