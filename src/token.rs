/// Possible tokens to find in a normalized formula
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A number literal, kept as text until the tree is built
    Value(String),
    /// An arithmetic operator
    Op(Op),
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
}

/// Allowed operators in the algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Plus,
    Minus,
    Mul,
    Div,
    /// Unary minus
    Neg,
    /// Unary plus
    Pos,
}

impl Op {
    /// Get the operator precedence. Operators with higher precedence should be
    /// evaluated first.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Mul | Self::Div => 2,
            Self::Neg | Self::Pos => 3,
        }
    }

    /// Check if the operator is left associative
    pub fn is_left_associative(self) -> bool {
        match self {
            Self::Plus | Self::Minus | Self::Mul | Self::Div => true,
            Self::Neg | Self::Pos => false,
        }
    }

    /// Check if the operator is right associative
    pub fn is_right_associative(self) -> bool {
        !self.is_left_associative()
    }

    /// Check if the operator takes a single operand
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Neg | Self::Pos)
    }
}
