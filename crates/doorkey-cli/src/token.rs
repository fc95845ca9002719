//! One-wire stand-in for hosts without a token reader.

use doorkey_core::constants::ROM_CODE_LENGTH;
use doorkey_hardware::{OneWireBus, Result};

/// Bus that always finds the same token, or never finds one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticToken {
    rom: Option<[u8; ROM_CODE_LENGTH]>,
}

impl StaticToken {
    pub fn new(rom: Option<[u8; ROM_CODE_LENGTH]>) -> Self {
        Self { rom }
    }
}

impl OneWireBus for StaticToken {
    fn search(&mut self) -> Result<Option<[u8; ROM_CODE_LENGTH]>> {
        Ok(self.rom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorkey_core::{Millis, SerialNumber, TokenSnapshot};
    use doorkey_hardware::TokenReader;

    #[test]
    fn test_static_token_is_reported() {
        let rom = [0x02, 0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00, 0xA2];
        let mut reader = TokenReader::with_defaults(StaticToken::new(Some(rom)));
        reader.poll(Millis::new(0));
        assert_eq!(
            reader.snapshot(),
            TokenSnapshot::present(0x02, SerialNumber::new([0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00]))
        );
    }

    #[test]
    fn test_no_token() {
        let mut reader = TokenReader::with_defaults(StaticToken::default());
        reader.poll(Millis::new(0));
        assert!(!reader.snapshot().present);
    }
}
