//! Arithmetic captcha shown next to the send button.

use rand::Rng;

const OPERAND_MIN: u8 = 1;
const OPERAND_MAX: u8 = 10;

/// A single "What is A + B?" challenge.
///
/// `expected` is always `operand_a + operand_b`; the fields are private so
/// the sum cannot drift from its operands. The sum is widened to `u16`, so
/// no pair of operands can overflow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptchaChallenge {
    operand_a: u8,
    operand_b: u8,
    expected: u16,
}

impl CaptchaChallenge {
    /// Draw two independent operands uniformly from `1..=10`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let operand_a = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
        let operand_b = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
        Self::from_operands(operand_a, operand_b)
    }

    /// Build a challenge from known operands.
    pub fn from_operands(operand_a: u8, operand_b: u8) -> Self {
        Self {
            operand_a,
            operand_b,
            expected: u16::from(operand_a) + u16::from(operand_b),
        }
    }

    pub fn operand_a(&self) -> u8 {
        self.operand_a
    }

    pub fn operand_b(&self) -> u8 {
        self.operand_b
    }

    pub fn expected(&self) -> u16 {
        self.expected
    }

    /// The prompt rendered by the presentation layer.
    pub fn question(&self) -> String {
        format!("What is {} + {}?", self.operand_a, self.operand_b)
    }

    /// Returns `true` iff `answer` parses to exactly the expected sum.
    ///
    /// Surrounding whitespace is ignored. Empty or non-numeric answers are
    /// simply wrong.
    pub fn verify(&self, answer: &str) -> bool {
        answer
            .trim()
            .parse::<u16>()
            .is_ok_and(|value| value == self.expected)
    }
}
