//! Static datapath component library (§4.7, new in this expansion).
//!
//! §1 treats `reg`, `program_counter`, `ram` and `alu` as external
//! collaborators — "datapath components... assumed pre-existing". That
//! assumption makes the two files `generate` emits useless on their own to
//! anyone who doesn't already have those components lying around, so this
//! module vendors a minimal behavioral VHDL-93 implementation of each,
//! written to `<name>/components/*.vhdl` alongside `control.vhdl` and
//! `main.vhdl` when the caller asks for it. The interface each one exposes
//! matches the ports [`crate::assemble::build_top`] wires against exactly.

/// 8-bit transparent register: latches `data_in` on `wr`, drives `data_out`
/// from its stored value on `rd`, high-Z otherwise.
pub const REG: &str = "\
library ieee;
use ieee.std_logic_1164.all;

entity reg is
    port (
        clock : in std_logic;
        data_in : in std_logic_vector(7 downto 0);
        data_out : out std_logic_vector(7 downto 0);
        wr : in std_logic;
        rd : in std_logic
    );
end reg;

architecture behavior of reg is
    signal value : std_logic_vector(7 downto 0) := \"00000000\";
begin
    process (clock)
    begin
        if clock'event and clock = '1' then
            if wr = '1' then
                value <= data_in;
            end if;
        end if;
    end process;

    data_out <= value when rd = '1' else \"ZZZZZZZZ\";
end behavior;
";

/// 8-bit up counter with the same read/write interface as [`REG`] plus an
/// `inc` strobe that increments on the next rising edge.
pub const PROGRAM_COUNTER: &str = "\
library ieee;
use ieee.std_logic_1164.all;
use ieee.std_logic_unsigned.all;

entity program_counter is
    port (
        clock : in std_logic;
        data_in : in std_logic_vector(7 downto 0);
        data_out : out std_logic_vector(7 downto 0);
        wr : in std_logic;
        rd : in std_logic;
        inc : in std_logic
    );
end program_counter;

architecture behavior of program_counter is
    signal value : std_logic_vector(7 downto 0) := \"00000000\";
begin
    process (clock)
    begin
        if clock'event and clock = '1' then
            if wr = '1' then
                value <= data_in;
            elsif inc = '1' then
                value <= value + 1;
            end if;
        end if;
    end process;

    data_out <= value when rd = '1' else \"ZZZZZZZZ\";
end behavior;
";

/// Byte-addressable RAM. `address` is sampled independently of the shared
/// bus so its width can track the computer's configured address width.
pub const RAM: &str = "\
library ieee;
use ieee.std_logic_1164.all;
use ieee.std_logic_unsigned.all;

entity ram is
    generic (
        address_width : integer := 5
    );
    port (
        clock : in std_logic;
        data_in : in std_logic_vector(7 downto 0);
        data_out : out std_logic_vector(7 downto 0);
        address : in std_logic_vector(address_width - 1 downto 0);
        wr_data : in std_logic;
        wr_addr : in std_logic;
        rd : in std_logic
    );
end ram;

architecture behavior of ram is
    type memory is array (0 to 2 ** address_width - 1) of std_logic_vector(7 downto 0);
    signal contents : memory := (others => \"00000000\");
    signal latched_address : std_logic_vector(address_width - 1 downto 0) := (others => '0');
begin
    process (clock)
    begin
        if clock'event and clock = '1' then
            if wr_addr = '1' then
                latched_address <= address;
            end if;
            if wr_data = '1' then
                contents(conv_integer(latched_address)) <= data_in;
            end if;
        end if;
    end process;

    data_out <= contents(conv_integer(latched_address)) when rd = '1' else \"ZZZZZZZZ\";
end behavior;
";

/// Combinational ALU implementing the three fixed operations (§3):
/// `complement = 101`, `add = 010`, `subtract = 110`.
pub const ALU: &str = "\
library ieee;
use ieee.std_logic_1164.all;
use ieee.std_logic_unsigned.all;

entity alu is
    port (
        clock : in std_logic;
        data_in : in std_logic_vector(7 downto 0);
        data_out : out std_logic_vector(7 downto 0);
        op : in std_logic_vector(2 downto 0);
        wr_a : in std_logic;
        wr_b : in std_logic;
        rd : in std_logic
    );
end alu;

architecture behavior of alu is
    signal operand_a : std_logic_vector(7 downto 0) := \"00000000\";
    signal operand_b : std_logic_vector(7 downto 0) := \"00000000\";
    signal result : std_logic_vector(7 downto 0) := \"00000000\";
begin
    process (clock)
    begin
        if clock'event and clock = '1' then
            if wr_a = '1' then
                operand_a <= data_in;
            end if;
            if wr_b = '1' then
                operand_b <= data_in;
            end if;
        end if;
    end process;

    process (op, operand_a, operand_b)
    begin
        case op is
            when \"101\" => result <= not operand_a;
            when \"010\" => result <= operand_a + operand_b;
            when \"110\" => result <= operand_a - operand_b;
            when others => result <= \"00000000\";
        end case;
    end process;

    data_out <= result when rd = '1' else \"ZZZZZZZZ\";
end behavior;
";

/// `(file stem, VHDL text)` pairs, in the order they're written to
/// `components/`.
pub const ALL: [(&str, &str); 4] = [
    ("program_counter", PROGRAM_COUNTER),
    ("reg", REG),
    ("ram", RAM),
    ("alu", ALU),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_component_declares_its_own_entity() {
        for (name, text) in ALL {
            assert!(
                text.contains(&format!("entity {name} is")),
                "{name} is missing its entity declaration"
            );
            assert!(text.contains("end behavior;"));
        }
    }
}
