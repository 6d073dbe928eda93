// Licensed under the Apache-2.0 license

//! Name conversion, literal formatting and bit-mask helpers shared by every
//! output target.

/// Converts a name to snake_case.
///
/// - Leading digits get an underscore prefix
/// - Punctuation and whitespace become underscores
/// - lower-to-upper CamelCase transitions get underscore separators
/// - Rust keywords get an underscore suffix
///
/// # Examples
/// ```
/// use regfile_generator::util::snake_case;
/// assert_eq!(snake_case("IntStatus"), "int_status");
/// assert_eq!(snake_case("UART_CTRL"), "uart_ctrl");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut result = String::new();
    if let Some(c) = name.chars().next() {
        if c.is_ascii_digit() {
            result.push('_');
        }
    }
    let mut prev = None;
    for c in name.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_punctuation() {
            if prev != Some('_') {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(prev) = prev {
            if prev.is_ascii_lowercase() && c.is_ascii_uppercase() {
                result.push('_');
            }
        }
        prev = Some(c);
        result.push(c.to_ascii_lowercase());
    }
    tweak_keywords(result.trim_end_matches('_')).to_string()
}

/// Converts a name to UPPER_SNAKE_CASE for constants and macros.
///
/// Keyword tweaking does not apply since upper-case names never clash.
///
/// ```
/// use regfile_generator::util::constant_case;
/// assert_eq!(constant_case("IntStatus"), "INT_STATUS");
/// assert_eq!(constant_case("tx fifo"), "TX_FIFO");
/// ```
pub fn constant_case(name: &str) -> String {
    snake_case(name).trim_end_matches('_').to_ascii_uppercase()
}

/// Converts a name to CamelCase (PascalCase).
///
/// # Examples
/// ```
/// use regfile_generator::util::camel_case;
/// assert_eq!(camel_case("uart_regs"), "UartRegs");
/// assert_eq!(camel_case("I2C_CTRL"), "I2cCtrl");
/// ```
pub fn camel_case(name: &str) -> String {
    let mut result = String::new();
    if let Some(c) = name.chars().next() {
        if c.is_ascii_digit() {
            result.push('_');
        }
    }
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_ascii_punctuation() || c.is_ascii_whitespace() {
            upper_next = true;
        } else {
            result.push(if upper_next {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            });
            upper_next = false;
        }
    }
    String::from(tweak_keywords(&result))
}

/// Appends underscore suffix to Rust keywords to avoid conflicts.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "as" => "as_",
        "break" => "break_",
        "const" => "const_",
        "continue" => "continue_",
        "crate" => "crate_",
        "else" => "else_",
        "enum" => "enum_",
        "extern" => "extern_",
        "false" => "false_",
        "fn" => "fn_",
        "for" => "for_",
        "if" => "if_",
        "impl" => "impl_",
        "in" => "in_",
        "let" => "let_",
        "loop" => "loop_",
        "match" => "match_",
        "mod" => "mod_",
        "move" => "move_",
        "mut" => "mut_",
        "pub" => "pub_",
        "ref" => "ref_",
        "return" => "return_",
        "self" => "self_",
        "Self" => "Self_",
        "static" => "static_",
        "struct" => "struct_",
        "super" => "super_",
        "trait" => "trait_",
        "true" => "true_",
        "type" => "type_",
        "unsafe" => "unsafe_",
        "use" => "use_",
        "where" => "where_",
        "while" => "while_",
        "async" => "async_",
        "await" => "await_",
        "dyn" => "dyn_",
        s => s,
    }
}

/// Formats an integer as a hex constant with underscores for readability.
///
/// Values <= 9 are formatted as decimal; larger values use hex with
/// underscore separators every 4 digits.
///
/// # Examples
/// ```
/// use regfile_generator::util::hex_const;
/// assert_eq!(hex_const(5), "5");
/// assert_eq!(hex_const(0x1234), "0x1234");
/// assert_eq!(hex_const(0x12345678), "0x1234_5678");
/// ```
pub fn hex_const(val: u64) -> String {
    if val > 9 {
        let mut x = String::new();
        for (i, c) in format!("{val:x}").chars().rev().enumerate() {
            if i % 4 == 0 && i != 0 {
                x.push('_');
            }
            x.push(c);
        }
        "0x".to_string() + &x.chars().rev().collect::<String>()
    } else {
        format!("{val}")
    }
}

/// Formats an unsigned C literal zero-padded to `bits` worth of hex digits.
///
/// Values wider than 32 bits get the `ULL` suffix so the literal keeps its
/// type on every C data model.
///
/// ```
/// use regfile_generator::util::c_hex;
/// assert_eq!(c_hex(0x3, 32), "0x00000003U");
/// assert_eq!(c_hex(0x10, 8), "0x10U");
/// assert_eq!(c_hex(1, 64), "0x0000000000000001ULL");
/// ```
pub fn c_hex(val: u64, bits: u32) -> String {
    let digits = hex_digits(bits);
    let suffix = if bits > 32 { "ULL" } else { "U" };
    format!("0x{val:0digits$X}{suffix}")
}

/// Number of hex digits needed to show `bits` bits (at least one).
pub fn hex_digits(bits: u32) -> usize {
    (bits.max(1) as usize).div_ceil(4)
}

/// All-ones mask of `width` bits shifted up to `position`.
///
/// Bits shifted beyond 64 are dropped; callers validate the range first.
///
/// ```
/// use regfile_generator::util::bit_mask;
/// assert_eq!(bit_mask(2, 3), 0b11100);
/// assert_eq!(bit_mask(0, 64), u64::MAX);
/// ```
pub fn bit_mask(position: u32, width: u32) -> u64 {
    if width == 0 || position >= 64 {
        return 0;
    }
    let ones = if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    ones << position
}

/// Name of the unsigned C type holding `data_width` bits.
pub fn c_type(data_width: u8) -> &'static str {
    match data_width {
        8 => "uint8_t",
        16 => "uint16_t",
        64 => "uint64_t",
        _ => "uint32_t",
    }
}

/// Name of the unsigned Rust type holding `data_width` bits.
pub fn rust_type(data_width: u8) -> &'static str {
    match data_width {
        8 => "u8",
        16 => "u16",
        64 => "u64",
        _ => "u32",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("MyRegister"), "my_register");
        assert_eq!(snake_case("I2C_CTRL"), "i2c_ctrl");
        assert_eq!(snake_case("HTTPServer"), "httpserver");
        assert_eq!(snake_case("type"), "type_");
        assert_eq!(snake_case("false"), "false_");
        assert_eq!(snake_case("TRUE"), "true_");
        assert_eq!(snake_case("0_cfg"), "_0_cfg");
    }

    #[test]
    fn test_constant_case() {
        assert_eq!(constant_case("ctrl"), "CTRL");
        assert_eq!(constant_case("IntEnable"), "INT_ENABLE");
        // Keyword tweaks are dropped again for constants.
        assert_eq!(constant_case("type"), "TYPE");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("my_register"), "MyRegister");
        assert_eq!(camel_case("HTTP_SERVER"), "HttpServer");
    }

    #[test]
    fn test_hex_const() {
        assert_eq!(hex_const(0), "0");
        assert_eq!(hex_const(9), "9");
        assert_eq!(hex_const(10), "0xa");
        assert_eq!(hex_const(0x12345678), "0x1234_5678");
    }

    #[test]
    fn test_c_hex() {
        assert_eq!(c_hex(0, 16), "0x0000U");
        assert_eq!(c_hex(0xABC, 12), "0xABCU");
        assert_eq!(c_hex(0xFF, 1), "0xFFU");
    }

    #[test]
    fn test_bit_mask() {
        assert_eq!(bit_mask(0, 1), 1);
        assert_eq!(bit_mask(4, 4), 0xF0);
        assert_eq!(bit_mask(31, 1), 0x8000_0000);
        assert_eq!(bit_mask(63, 1), 1 << 63);
        assert_eq!(bit_mask(0, 0), 0);
        assert_eq!(bit_mask(64, 1), 0);
    }
}
