use super::{Engine, Output, StorageQuery};
use crate::command::phonebook::types::PbEntry;
use crate::command::types::MemoryInfo;
use crate::parser::cursor::Cursor;

impl Engine {
    pub fn phonebook_storage(&self) -> &MemoryInfo {
        &self.phonebook_storage
    }

    /// `+CPBS` in one of its three shapes.
    pub(crate) fn parse_cpbs(&mut self, line: &[u8], query: StorageQuery) {
        let mut cur = Cursor::new(line);
        cur.advance(7);

        let info = &mut self.phonebook_storage;
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

    /// `+CPBR: <index>,<number>,<type>,<text>` and the same shaped `+CPBF`.
    /// Entries beyond the list capacity are skipped.
    pub(crate) fn parse_cpb_entry(&mut self, line: &[u8]) {
        let Output::Phonebook(list) = &mut self.output else {
            return;
        };
        if list.is_full() {
            return;
        }

        let mut cur = Cursor::new(line);
        cur.advance(7);
        let entry = PbEntry {
            pos: cur.read_number() as usize,
            number: cur.read_string(),
            number_type: cur.read_number() as u8,
            name: cur.read_string(),
        };
        list.push(entry).ok();
    }
}
