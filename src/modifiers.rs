// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declaration modifiers, using the class-file bit values.
//!
//! Index keys carry them as two 16-bit halves, so bits above 0xFFFF
//! (`DEFAULT`, `DEPRECATED`) exercise the high half.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICTFP = 0x0800;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const DEFAULT = 0x0001_0000;
        const DEPRECATED = 0x0010_0000;
    }
}

impl Modifiers {
    /// Map one source keyword to its bit; annotations other than `@Deprecated` map to nothing.
    pub fn from_keyword(keyword: &str) -> Modifiers {
        match keyword {
            "public" => Modifiers::PUBLIC,
            "private" => Modifiers::PRIVATE,
            "protected" => Modifiers::PROTECTED,
            "static" => Modifiers::STATIC,
            "final" => Modifiers::FINAL,
            "synchronized" => Modifiers::SYNCHRONIZED,
            "volatile" => Modifiers::VOLATILE,
            "transient" => Modifiers::TRANSIENT,
            "native" => Modifiers::NATIVE,
            "abstract" => Modifiers::ABSTRACT,
            "strictfp" => Modifiers::STRICTFP,
            "default" => Modifiers::DEFAULT,
            "@Deprecated" => Modifiers::DEPRECATED,
            _ => Modifiers::empty(),
        }
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Modifiers::PRIVATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_bits() {
        let mods = Modifiers::from_keyword("public") | Modifiers::from_keyword("static");
        assert!(mods.is_static());
        assert!(!mods.is_private());
        assert_eq!(Modifiers::from_keyword("@Override"), Modifiers::empty());
        assert_eq!(Modifiers::from_keyword("default").bits(), 0x0001_0000);
    }
}
