//! 坐标记号
//!
//! 格子记为纵线字母加横线数字（`e2`），走法为起点加终点，升变时追加大写字母（`e7e8Q`）。

use crate::error::{ChessError, Result};
use crate::moves::{Move, Promotion};
use crate::piece::Square;

/// 坐标记号
pub struct Notation;

impl Notation {
    /// 解析格子记号
    pub fn parse_square(s: &str) -> Result<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(invalid(s));
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(invalid(s));
        }
        Ok(Square::new_unchecked(b'8' - rank, file - b'a'))
    }

    /// 解析走法记号，`0000` 解析为空走法
    pub fn parse_move(s: &str) -> Result<Move> {
        if s == "0000" {
            return Ok(Move::NULL);
        }
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(invalid(s));
        }

        let from = Self::parse_square(&s[0..2]).map_err(|_| invalid(s))?;
        let to = Self::parse_square(&s[2..4]).map_err(|_| invalid(s))?;

        match s[4..].chars().next() {
            None => Ok(Move::new(from, to)),
            Some(c) => {
                let promotion = Promotion::from_char(c).ok_or_else(|| invalid(s))?;
                Ok(Move::with_promotion(from, to, promotion))
            }
        }
    }

    /// 走法记号
    pub fn to_coordinate(mv: &Move) -> String {
        mv.to_string()
    }
}

fn invalid(s: &str) -> ChessError {
    ChessError::InvalidNotation {
        notation: s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square() {
        assert_eq!(Notation::parse_square("a8").unwrap(), Square::new_unchecked(0, 0));
        assert_eq!(Notation::parse_square("e2").unwrap(), Square::new_unchecked(6, 4));
        assert_eq!(Notation::parse_square("h1").unwrap(), Square::new_unchecked(7, 7));
        assert!(Notation::parse_square("i1").is_err());
        assert!(Notation::parse_square("a9").is_err());
        assert!(Notation::parse_square("a").is_err());
    }

    #[test]
    fn test_parse_move() {
        let mv = Notation::parse_move("e2e4").unwrap();
        assert_eq!(mv.from.to_index(), 52);
        assert_eq!(mv.to.to_index(), 36);
        assert_eq!(mv.promotion, None);

        let promo = Notation::parse_move("e7e8q").unwrap();
        assert_eq!(promo.promotion, Some(Promotion::Queen));
        assert_eq!(Notation::to_coordinate(&promo), "e7e8Q");

        assert!(Notation::parse_move("0000").unwrap().is_null());
    }

    #[test]
    fn test_parse_move_invalid() {
        for s in ["", "e2", "e2e9", "e7e8K", "e2e4e5", "é2e4"] {
            assert_eq!(
                Notation::parse_move(s),
                Err(ChessError::InvalidNotation {
                    notation: s.to_string()
                })
            );
        }
    }

    #[test]
    fn test_render_parse_agree() {
        for s in ["a1h8", "g1f3", "b2b1N", "h7h8R"] {
            assert_eq!(Notation::parse_move(s).unwrap().to_string(), s);
        }
    }
}
