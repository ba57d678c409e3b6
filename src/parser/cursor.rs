//! Primitive readers over a single response line.
//!
//! None of the readers fail. Malformed input yields a best effort default
//! (`0`, an empty string, [`Memory::Unknown`]) and the cursor is moved past
//! whatever could be recognised. Reading past the end of the line behaves as
//! if a NUL terminator followed it, so the cursor stalls at the end instead
//! of running off.

use heapless::String;
use no_std_net::Ipv4Addr;

use crate::command::types::{DateTime, Memory, MemorySet};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    line: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(line: &'a [u8]) -> Self {
        Self { line, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.line[self.pos..]
    }

    /// Current byte, `0` once the line is exhausted.
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.line.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn bump(&mut self) {
        if self.pos < self.line.len() {
            self.pos += 1;
        }
    }

    /// Consume `c` if it is the current byte.
    pub fn eat(&mut self, c: u8) -> bool {
        if self.pos < self.line.len() && self.line[self.pos] == c {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// True at the end of the line or on a line terminator.
    pub fn is_at_end(&self) -> bool {
        matches!(self.peek(), 0 | b'\r' | b'\n')
    }

    /// Skip a fixed length response prefix such as `+CREG: `.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.line.len());
    }

    fn skip_leading_separators(&mut self) {
        self.eat(b'"');
        self.eat(b',');
        self.eat(b'"');
        while matches!(self.peek(), b'/' | b':' | b'+') {
            self.bump();
        }
    }

    /// Signed decimal integer.
    ///
    /// Leading quote/comma/quote and any datetime separators (`/`, `:`, `+`)
    /// are skipped, a trailing quote is consumed.
    pub fn read_number(&mut self) -> i32 {
        self.skip_leading_separators();
        let negative = self.eat(b'-');

        let mut val: i32 = 0;
        while self.peek().is_ascii_digit() {
            val = val
                .wrapping_mul(10)
                .wrapping_add(i32::from(self.peek() - b'0'));
            self.bump();
        }
        self.eat(b'"');

        if negative {
            val.wrapping_neg()
        } else {
            val
        }
    }

    /// Unsigned hexadecimal integer. Unlike [`Cursor::read_number`] a trailing
    /// comma is consumed instead of a trailing quote.
    pub fn read_hex(&mut self) -> u32 {
        self.skip_leading_separators();

        let mut val: u32 = 0;
        while let Some(n) = crate::hex::nibble(self.peek()) {
            val = (val << 4) | u32::from(n);
            self.bump();
        }
        self.eat(b',');
        val
    }

    /// Copy a (usually quoted) string field into `dst`.
    ///
    /// At most `dst.len() - 1` bytes are copied and a NUL terminator is
    /// always written. When `dst` is full and `trim` is false the cursor stops
    /// right there; with `trim` the rest of the field is consumed without
    /// being stored. Passing `None` only moves the cursor past the field.
    /// An unquoted field ends at the next comma, which is left in place.
    ///
    /// Returns the number of bytes copied.
    pub fn read_string_into(&mut self, mut dst: Option<&mut [u8]>, trim: bool) -> usize {
        self.eat(b',');
        let quoted = self.eat(b'"');

        let cap = dst.as_ref().map(|d| d.len().saturating_sub(1)).unwrap_or(0);
        let mut copied = 0;

        while self.pos < self.line.len() {
            let c = self.peek();
            if c == b'"' && matches!(self.peek_at(1), 0 | b',' | b'\r' | b'\n') {
                self.bump();
                break;
            }
            if !quoted && c == b',' {
                break;
            }
            if let Some(dst) = dst.as_deref_mut() {
                if copied < cap {
                    dst[copied] = c;
                    copied += 1;
                } else if !trim {
                    break;
                }
            }
            self.bump();
        }

        if let Some(dst) = dst {
            if let Some(term) = dst.get_mut(copied) {
                *term = 0;
            }
        }
        copied
    }

    /// Read a string field into an owned buffer, truncating to `N` bytes and
    /// always consuming the whole field.
    pub fn read_string<const N: usize>(&mut self) -> String<N> {
        self.eat(b',');
        let quoted = self.eat(b'"');

        let mut s = String::new();
        while self.pos < self.line.len() {
            let c = self.peek();
            if c == b'"' && matches!(self.peek_at(1), 0 | b',' | b'\r' | b'\n') {
                self.bump();
                break;
            }
            if !quoted && c == b',' {
                break;
            }
            if c.is_ascii() {
                s.push(c as char).ok();
            }
            self.bump();
        }
        s
    }

    pub fn skip_string(&mut self) {
        self.read_string_into(None, true);
    }

    /// Move past the next comma, or to the end of the line.
    pub fn next_param(&mut self) {
        while self.pos < self.line.len() && self.peek() != b',' {
            self.bump();
        }
        self.eat(b',');
    }

    /// Skip the remainder of a string field unless the cursor already sits
    /// on a separator.
    pub fn check_and_trim(&mut self) {
        if !matches!(self.peek(), b'"' | b'\r' | b',') {
            self.skip_string();
        }
    }

    /// Dotted quad, optionally quoted.
    pub fn read_ip(&mut self) -> Ipv4Addr {
        self.eat(b',');
        self.eat(b'"');

        let mut octets = [0u8; 4];
        if self.peek().is_ascii_digit() {
            for (i, octet) in octets.iter_mut().enumerate() {
                if i > 0 {
                    self.bump();
                }
                *octet = self.read_number() as u8;
            }
        }
        self.eat(b'"');

        Ipv4Addr::from(octets)
    }

    /// Six hex octets separated by single characters, optionally quoted.
    pub fn read_mac(&mut self) -> [u8; 6] {
        self.eat(b'"');

        let mut mac = [0u8; 6];
        for (i, octet) in mac.iter_mut().enumerate() {
            if i > 0 {
                self.bump();
            }
            *octet = self.read_hex() as u8;
        }
        self.eat(b'"');
        self.eat(b',');
        mac
    }

    /// Storage area code such as `"SM"`.
    pub fn read_memory(&mut self) -> Memory {
        self.eat(b',');
        self.eat(b'"');

        let rest = self.remaining();
        let mem = Memory::TABLE
            .iter()
            .find(|(code, _)| rest.starts_with(*code))
            .map(|&(code, mem)| {
                self.advance(code.len());
                mem
            });

        match mem {
            Some(mem) => {
                self.eat(b'"');
                mem
            }
            None => {
                self.skip_string();
                Memory::Unknown
            }
        }
    }

    /// Parenthesised list of storage area codes, `("SM","ME")`.
    pub fn read_memories(&mut self) -> MemorySet {
        self.eat(b',');
        self.eat(b'(');

        let mut set = MemorySet::empty();
        loop {
            let before = self.pos;
            let mem = self.read_memory();
            if mem != Memory::Unknown {
                set.insert(mem);
            }
            if matches!(self.peek(), 0 | b')') || self.pos == before {
                break;
            }
        }
        self.eat(b')');
        set
    }

    /// `dd/MM/yy,hh:mm:ss[±tz]`, optionally quoted. The timezone suffix is
    /// skipped.
    pub fn read_datetime(&mut self) -> DateTime {
        let day = self.read_number() as u8;
        let month = self.read_number() as u8;
        let year = 2000u16.wrapping_add(self.read_number() as u16);
        let hours = self.read_number() as u8;
        let minutes = self.read_number() as u8;
        let seconds = self.read_number() as u8;
        self.check_and_trim();

        DateTime {
            year,
            month,
            day,
            hours,
            minutes,
            seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_shapes() {
        for n in [0, 7, 42, 65535, -12, 2_147_483_647] {
            let shapes: [std::string::String; 5] = [
                format!("{}", n),
                format!("\"{}\"", n),
                format!(",{}", n),
                format!(",\"{}\"", n),
                format!("/{}", n),
            ];
            for shape in shapes.iter() {
                let mut cur = Cursor::new(shape.as_bytes());
                assert_eq!(cur.read_number(), n, "shape {}", shape);
                assert_eq!(cur.position(), shape.len(), "shape {}", shape);
            }
        }
    }

    #[test]
    fn number_stops_at_separator() {
        let mut cur = Cursor::new(b"1,23");
        assert_eq!(cur.read_number(), 1);
        assert_eq!(cur.peek(), b',');
        assert_eq!(cur.read_number(), 23);
        assert!(cur.is_at_end());
    }

    #[test]
    fn number_on_garbage_is_zero() {
        let mut cur = Cursor::new(b"abc");
        assert_eq!(cur.read_number(), 0);
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn hex_consumes_trailing_comma() {
        let mut cur = Cursor::new(b"1A2B,");
        assert_eq!(cur.read_hex(), 0x1A2B);
        assert_eq!(cur.position(), 5);
    }

    #[test]
    fn string_trim_modes() {
        let input = b"\"hello world\",";

        let mut dst = [0xffu8; 5];
        let mut cur = Cursor::new(input);
        assert_eq!(cur.read_string_into(Some(&mut dst), false), 4);
        assert_eq!(&dst, b"hell\0");
        // Stops on the first byte that did not fit.
        assert_eq!(cur.peek(), b'o');

        let mut dst = [0xffu8; 5];
        let mut cur = Cursor::new(input);
        assert_eq!(cur.read_string_into(Some(&mut dst), true), 4);
        assert_eq!(&dst, b"hell\0");
        // Consumes through the closing quote.
        assert_eq!(cur.position(), input.len() - 1);
        assert_eq!(cur.peek(), b',');
    }

    #[test]
    fn string_skip_mode() {
        let mut cur = Cursor::new(b",\"a,b\",\"c\"");
        cur.skip_string();
        // The comma inside the field is not followed by a closing quote.
        assert_eq!(cur.remaining(), b",\"c\"");
        let s: String<4> = cur.read_string();
        assert_eq!(s.as_str(), "c");
        assert!(cur.is_at_end());
    }

    #[test]
    fn empty_unquoted_field() {
        let mut cur = Cursor::new(b",,\"x\"");
        let s: String<4> = cur.read_string();
        assert!(s.is_empty());
        let s: String<4> = cur.read_string();
        assert_eq!(s.as_str(), "x");
    }

    #[test]
    fn owned_string_truncates() {
        let mut cur = Cursor::new(b"\"Operator A\",\"OpA\"");
        let s: String<4> = cur.read_string();
        assert_eq!(s.as_str(), "Oper");
        let s: String<8> = cur.read_string();
        assert_eq!(s.as_str(), "OpA");
    }

    #[test]
    fn next_param_is_bounded() {
        let mut cur = Cursor::new(b"\"host\",1.2.3.4");
        cur.next_param();
        assert_eq!(cur.remaining(), b"1.2.3.4");
        cur.next_param();
        assert!(cur.is_at_end());
    }

    #[test]
    fn ip_and_mac() {
        let mut cur = Cursor::new(b",\"192.168.1.20\",80");
        assert_eq!(cur.read_ip(), Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(cur.read_number(), 80);

        let mut cur = Cursor::new(b"\"de:ad:be:ef:00:01\",");
        assert_eq!(cur.read_mac(), [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert!(cur.is_at_end());
    }

    #[test]
    fn memory_codes() {
        let mut cur = Cursor::new(b"\"ME\",3");
        assert_eq!(cur.read_memory(), Memory::MobileEquipment);
        assert_eq!(cur.read_number(), 3);

        let mut cur = Cursor::new(b"\"XX\",3");
        assert_eq!(cur.read_memory(), Memory::Unknown);
        assert_eq!(cur.read_number(), 3);
    }

    #[test]
    fn memory_list() {
        let mut cur = Cursor::new(b"(\"SM\",\"ME\"),(\"SR\")");
        let set = cur.read_memories();
        assert!(set.contains(Memory::Sim));
        assert!(set.contains(Memory::MobileEquipment));
        assert!(!set.contains(Memory::StatusReport));

        let set = cur.read_memories();
        assert!(set.contains(Memory::StatusReport));
        assert!(cur.is_at_end());
    }

    #[test]
    fn datetime_with_timezone() {
        let mut cur = Cursor::new(b",\"19/11/21,08:15:42+04\",5");
        let dt = cur.read_datetime();
        assert_eq!(
            dt,
            DateTime {
                year: 2021,
                month: 11,
                day: 19,
                hours: 8,
                minutes: 15,
                seconds: 42,
            }
        );
        assert_eq!(cur.read_number(), 5);
    }

    #[test]
    fn datetime_with_oversized_year() {
        let mut cur = Cursor::new(b"\"01/02/65535,03:04:05\"");
        let dt = cur.read_datetime();
        assert_eq!(dt.year, 1999);
        assert_eq!((dt.day, dt.month), (1, 2));
        assert_eq!((dt.hours, dt.minutes, dt.seconds), (3, 4, 5));
    }
}
