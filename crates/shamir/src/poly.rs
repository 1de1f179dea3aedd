//! Polynomial machinery behind split and combine.
//!
//! Splitting builds one random polynomial per secret byte, with the byte as
//! the constant term, and evaluates every polynomial at each share identity.
//! Combining runs Lagrange interpolation at x = 0 to recover the constant
//! terms.

use super::gf256::Gf256;
use super::share::Share;

/// Builds a polynomial of degree `randomness.len()` whose constant term is
/// `constant` and whose remaining coefficients are taken from `randomness`
/// verbatim.
///
/// Coefficients are stored highest degree first, constant term last, the
/// order [`evaluate`] expects. The caller supplies `randomness` already drawn
/// from its entropy source; a threshold-t split passes t−1 bytes.
pub fn polynomial(constant: Gf256, randomness: &[u8]) -> Vec<Gf256> {
    let mut coefficients = Vec::with_capacity(randomness.len() + 1);
    coefficients.extend(randomness.iter().copied().map(Gf256));
    coefficients.push(constant);
    coefficients
}

/// Evaluates a polynomial at `x` by Horner's rule.
///
/// `coefficients` are highest degree first, so the fold is
/// `((c_n·x + c_{n-1})·x + …)·x + c_0`.
pub fn evaluate(coefficients: &[Gf256], x: Gf256) -> Gf256 {
    coefficients
        .iter()
        .fold(Gf256::ZERO, |acc, &coefficient| acc * x + coefficient)
}

/// Returns an iterator of shares obtained by evaluating every polynomial at
/// x = 1, 2, …, 255 in turn.
///
/// Each polynomial corresponds to one byte position of the secret; the j-th
/// yielded share carries identity j and one evaluation per position. Zero is
/// never used as an identity: a share at x = 0 would carry the secret itself.
pub fn share_stream(polynomials: Vec<Vec<Gf256>>) -> impl Iterator<Item = Share> {
    (1..=u8::MAX).map(Gf256).map(move |x| {
        let y = polynomials
            .iter()
            .map(|polynomial| evaluate(polynomial, x))
            .collect();
        Share::new(x, y)
    })
}

/// Recovers, for every byte position, the constant term of the unique
/// polynomial through the supplied points.
///
/// With the Lagrange basis evaluated at x = 0 the weight of share j reduces
/// to Π_{i≠j} xᵢ / (xⱼ − xᵢ); each output byte is the weighted XOR-sum of
/// the corresponding y values. The result is only the original secret when
/// the shares are a large-enough subset from a single split — this function
/// has no way to tell, and interpolates whatever it is given.
pub fn interpolate(shares: &[Share]) -> Vec<u8> {
    let width = shares.first().map_or(0, |share| share.y.len());
    (0..width)
        .map(|position| interpolate_at_zero(shares, position).value())
        .collect()
}

fn interpolate_at_zero(shares: &[Share], position: usize) -> Gf256 {
    shares
        .iter()
        .map(|share_j| {
            let basis = shares
                .iter()
                .filter(|share_i| share_i.x != share_j.x)
                .map(|share_i| share_i.x / (share_j.x - share_i.x))
                .product::<Gf256>();
            basis * share_j.y[position]
        })
        .sum()
}
