use num::FromPrimitive;
use num_derive::FromPrimitive;
use num_traits::{Float, One, Zero};

use crate::registry::{Arity, Domain};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum Builtin {
    Add = 0,
    Sub = 1,
    Mult = 2,
    Div = 3,
    Exp = 4,
    Square = 5,
    Sqrt = 6,
    Cube = 7,
    Cubert = 8,
    Eq = 9,
    Pos = 10,
    Neg = 11,
    Max = 12,
    Min = 13,
}

fn truth(b: bool) -> f64 {
    if b {
        f64::one()
    } else {
        f64::zero()
    }
}

fn add(args: &[f64]) -> Result<f64, Domain> {
    Ok(args.iter().fold(f64::zero(), |sum, a| sum + a))
}

fn sub(args: &[f64]) -> Result<f64, Domain> {
    Ok(args[0] - args[1])
}

fn mult(args: &[f64]) -> Result<f64, Domain> {
    Ok(args.iter().fold(f64::one(), |product, a| product * a))
}

fn div(args: &[f64]) -> Result<f64, Domain> {
    if args[1].is_zero() {
        Err(Domain::DivisionByZero)
    } else {
        Ok(args[0] / args[1])
    }
}

fn exp(args: &[f64]) -> Result<f64, Domain> {
    let (base, exponent) = (args[0], args[1]);
    if base.is_zero() && exponent < 0.0 {
        return Err(Domain::DivisionByZero);
    }
    let value = Float::powf(base, exponent);
    if value.is_nan() {
        Err(Domain::OutOfDomain)
    } else {
        Ok(value)
    }
}

fn square(args: &[f64]) -> Result<f64, Domain> {
    Ok(Float::powi(args[0], 2))
}

fn sqrt(args: &[f64]) -> Result<f64, Domain> {
    if args[0] < 0.0 {
        Err(Domain::OutOfDomain)
    } else {
        Ok(Float::sqrt(args[0]))
    }
}

fn cube(args: &[f64]) -> Result<f64, Domain> {
    Ok(Float::powi(args[0], 3))
}

fn cubert(args: &[f64]) -> Result<f64, Domain> {
    Ok(Float::cbrt(args[0]))
}

fn eq(args: &[f64]) -> Result<f64, Domain> {
    Ok(truth(args[0] == args[1]))
}

fn pos(args: &[f64]) -> Result<f64, Domain> {
    Ok(truth(args[0] > 0.0))
}

fn neg(args: &[f64]) -> Result<f64, Domain> {
    Ok(truth(args[0] < 0.0))
}

fn max(args: &[f64]) -> Result<f64, Domain> {
    args.iter().copied().reduce(f64::max).ok_or(Domain::OutOfDomain)
}

fn min(args: &[f64]) -> Result<f64, Domain> {
    args.iter().copied().reduce(f64::min).ok_or(Domain::OutOfDomain)
}

impl Builtin {
    pub fn all() -> impl Iterator<Item = Builtin> {
        (0..).map_while(Builtin::from_u32)
    }

    /// The function backing this operator. It indexes `args` directly, so the
    /// argument count must already satisfy [`Builtin::arity`].
    pub fn get_func(&self) -> fn(&[f64]) -> Result<f64, Domain> {
        match self {
            Builtin::Add => add,
            Builtin::Sub => sub,
            Builtin::Mult => mult,
            Builtin::Div => div,
            Builtin::Exp => exp,
            Builtin::Square => square,
            Builtin::Sqrt => sqrt,
            Builtin::Cube => cube,
            Builtin::Cubert => cubert,
            Builtin::Eq => eq,
            Builtin::Pos => pos,
            Builtin::Neg => neg,
            Builtin::Max => max,
            Builtin::Min => min,
        }
    }

    pub const fn arity(&self) -> Arity {
        match self {
            Builtin::Add | Builtin::Mult => Arity::AtLeast(0),
            Builtin::Max | Builtin::Min => Arity::AtLeast(1),
            Builtin::Sub | Builtin::Div | Builtin::Exp | Builtin::Eq => Arity::Exactly(2),
            Builtin::Square
            | Builtin::Sqrt
            | Builtin::Cube
            | Builtin::Cubert
            | Builtin::Pos
            | Builtin::Neg => Arity::Exactly(1),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Builtin::Add => "ADD",
            Builtin::Sub => "SUB",
            Builtin::Mult => "MULT",
            Builtin::Div => "DIV",
            Builtin::Exp => "EXP",
            Builtin::Square => "SQUARE",
            Builtin::Sqrt => "SQRT",
            Builtin::Cube => "CUBE",
            Builtin::Cubert => "CUBERT",
            Builtin::Eq => "EQ",
            Builtin::Pos => "POS",
            Builtin::Neg => "NEG",
            Builtin::Max => "MAX",
            Builtin::Min => "MIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn call(builtin: Builtin, args: &[f64]) -> Result<f64, Domain> {
        assert!(builtin.arity().accepts(args.len()));
        builtin.get_func()(args)
    }

    #[test]
    fn enumerates_every_builtin() {
        assert_eq!(Builtin::all().count(), 14);
        assert_eq!(Builtin::all().last(), Some(Builtin::Min));
        let names: Vec<_> = Builtin::all().map(|builtin| builtin.as_str()).collect();
        assert_eq!(names.len(), names.iter().unique().count());
    }

    #[test]
    fn arithmetic() {
        assert_eq!(call(Builtin::Add, &[1.0, 2.0, 3.0]), Ok(6.0));
        assert_eq!(call(Builtin::Sub, &[1.0, 3.0]), Ok(-2.0));
        assert_eq!(call(Builtin::Mult, &[2.0, 3.0, 4.0]), Ok(24.0));
        assert_eq!(call(Builtin::Mult, &[]), Ok(1.0));
        assert_eq!(call(Builtin::Div, &[1.0, 4.0]), Ok(0.25));
        assert_eq!(call(Builtin::Exp, &[2.0, 10.0]), Ok(1024.0));
        assert_eq!(call(Builtin::Square, &[-3.0]), Ok(9.0));
        assert_eq!(call(Builtin::Sqrt, &[16.0]), Ok(4.0));
        assert_eq!(call(Builtin::Cube, &[-2.0]), Ok(-8.0));
        assert!((call(Builtin::Cubert, &[-8.0]).unwrap() + 2.0).abs() < 1e-12);
        assert_eq!(call(Builtin::Max, &[1.0, 7.0, -2.0]), Ok(7.0));
        assert_eq!(call(Builtin::Min, &[1.0, 7.0, -2.0]), Ok(-2.0));
    }

    #[test]
    fn predicates() {
        assert_eq!(call(Builtin::Eq, &[2.0, 2.0]), Ok(1.0));
        assert_eq!(call(Builtin::Eq, &[2.0, 3.0]), Ok(0.0));
        assert_eq!(call(Builtin::Pos, &[0.5]), Ok(1.0));
        assert_eq!(call(Builtin::Pos, &[0.0]), Ok(0.0));
        assert_eq!(call(Builtin::Neg, &[-0.5]), Ok(1.0));
    }

    #[test]
    fn domain_failures() {
        assert_eq!(call(Builtin::Div, &[1.0, 0.0]), Err(Domain::DivisionByZero));
        assert_eq!(call(Builtin::Exp, &[0.0, -1.0]), Err(Domain::DivisionByZero));
        assert_eq!(call(Builtin::Exp, &[-8.0, 0.5]), Err(Domain::OutOfDomain));
        assert_eq!(call(Builtin::Sqrt, &[-1.0]), Err(Domain::OutOfDomain));
    }
}
