//! Scene files.
//!
//! Plain whitespace-separated text: the gravitational constant and body count,
//! then twelve numbers per body:
//!
//! ```text
//! G N
//! radius mass px py pz vx vy vz red green blue reflection
//! ...
//! ```
//!
//! Anything after the last body is ignored.

use std::path::Path;
use std::str::FromStr;

use tracing::info;
use ultraviolet::Vec3;

use crate::body::{Body, Material};
use crate::error::SceneError;
use crate::geometry::Color;

/// Scalars per body record.
pub const FIELDS_PER_BODY: usize = 12;

/// Parsed scene file contents.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneFile {
    pub g: f64,
    pub bodies: Vec<Body>,
}

pub fn load(path: impl AsRef<Path>) -> Result<SceneFile, SceneError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let scene = parse(&text)?;
    info!(path = %path.display(), bodies = scene.bodies.len(), g = scene.g, "loaded scene");
    Ok(scene)
}

/// Reads only the header of a scene file: `(G, body count)`.
pub fn peek_header(path: impl AsRef<Path>) -> Result<(f64, usize), SceneError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tokens = Tokens::new(&text);
    Ok((tokens.next("gravitational constant")?, tokens.next("body count")?))
}

pub fn parse(text: &str) -> Result<SceneFile, SceneError> {
    let mut tokens = Tokens::new(text);
    let g: f64 = tokens.next("gravitational constant")?;
    let count: usize = tokens.next("body count")?;

    // the count is untrusted; a record needs at least 2 bytes per scalar
    let mut bodies = Vec::with_capacity(count.min(text.len() / (2 * FIELDS_PER_BODY)));
    for index in 0..count {
        let mut f = [0.0f32; FIELDS_PER_BODY];
        for slot in f.iter_mut() {
            *slot = tokens.next("number")?;
        }
        let [radius, mass, px, py, pz, vx, vy, vz, red, green, blue, reflection] = f;
        let body = Body::new(
            Vec3::new(px, py, pz),
            Vec3::new(vx, vy, vz),
            mass,
            radius,
            Material::new(Color::new(red, green, blue), reflection),
        );
        body.validate(index)?;
        bodies.push(body);
    }

    Ok(SceneFile { g, bodies })
}

/// Whitespace tokens with line numbers.
struct Tokens<'a> {
    iter: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    consumed: usize,
    expected_total: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let iter = text
            .lines()
            .enumerate()
            .flat_map(|(n, line)| line.split_whitespace().map(move |tok| (n + 1, tok)));
        Self {
            iter: Box::new(iter),
            consumed: 0,
            expected_total: 2,
        }
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, SceneError> {
        let Some((line, token)) = self.iter.next() else {
            return Err(SceneError::Truncated {
                expected: self.expected_total.max(self.consumed + 1),
                found: self.consumed,
            });
        };
        self.consumed += 1;
        let value = token.parse::<T>().map_err(|_| SceneError::Parse {
            line,
            token: token.to_string(),
            expected,
        })?;
        if self.consumed == 2 {
            // the body count is the second token
            if let Ok(n) = token.parse::<usize>() {
                self.expected_total = n.saturating_mul(FIELDS_PER_BODY).saturating_add(2);
            }
        }
        Ok(value)
    }
}
