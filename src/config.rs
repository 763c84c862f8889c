use crate::motion::Speeds;
use crate::ray::MarchLimits;
use anyhow::Context;
use std::path::PathBuf;

/// Prefix of the environment variables read by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "GRIDCAST_";

#[derive(Clone, PartialEq, Debug)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub target_fps: u64,
    /// cells per second
    pub move_speed: f32,
    /// radians per second
    pub turn_speed: f32,
    /// degrees, used when the map does not set one
    pub fov: f32,
    pub max_distance: f32,
    pub max_steps: usize,
    /// overhead view dash and gap, in pixels
    pub dash: f32,
    pub gap: f32,
    /// `None` loads the built-in map
    pub map: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            target_fps: 60,
            move_speed: 5.,
            turn_speed: 3.,
            fov: 66.,
            max_distance: 100.,
            max_steps: 1024,
            dash: 10.,
            gap: 5.,
            map: None,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid value for {ENV_PREFIX}{key}: {value:?}"))
}

/// Field of view must leave a finite, unmirrored view plane.
pub(crate) fn check_fov(fov: f32) -> anyhow::Result<()> {
    if !(fov > 0. && fov < 180.) {
        anyhow::bail!("field of view must be between 0 and 180 degrees, got {fov}");
    }
    Ok(())
}

impl Settings {
    /// Defaults overridden by any `GRIDCAST_*` variables in the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut this = Self::default();
        this.apply(
            std::env::vars()
                .filter_map(|(key, value)| Some((key.strip_prefix(ENV_PREFIX)?.to_owned(), value))),
        )?;
        log::info!("settings: {this:?}");
        Ok(this)
    }

    /// Override fields from `(KEY, value)` pairs, keys without the prefix.
    /// Unknown keys are ignored (with a warning) so `GRIDCAST_LOG` can share the prefix.
    pub fn apply<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> anyhow::Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "WIDTH" => self.width = parse(key, value)?,
                "HEIGHT" => self.height = parse(key, value)?,
                "FPS" => self.target_fps = parse(key, value)?,
                "FOV" => self.fov = parse(key, value)?,
                "MOVE_SPEED" => self.move_speed = parse(key, value)?,
                "TURN_SPEED" => self.turn_speed = parse(key, value)?,
                "MAX_DISTANCE" => self.max_distance = parse(key, value)?,
                "MAP" => self.map = Some(value.into()),
                "LOG" => {}
                other => log::warn!("ignoring unknown setting {ENV_PREFIX}{other}"),
            }
        }

        if self.width == 0 || self.height == 0 {
            anyhow::bail!("screen size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.target_fps == 0 {
            anyhow::bail!("{ENV_PREFIX}FPS must be non-zero");
        }
        check_fov(self.fov)?;
        if !(self.max_distance.is_finite() && self.max_distance > 0.) {
            anyhow::bail!(
                "{ENV_PREFIX}MAX_DISTANCE must be finite and positive, got {}",
                self.max_distance
            );
        }

        Ok(())
    }

    pub fn limits(&self) -> MarchLimits {
        MarchLimits {
            max_distance: self.max_distance,
            max_steps: self.max_steps,
        }
    }

    pub fn speeds(&self) -> Speeds {
        Speeds {
            movement: self.move_speed,
            turn: self.turn_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_known_keys() {
        let mut settings = Settings::default();
        settings
            .apply([
                ("WIDTH", "800"),
                ("HEIGHT", " 600 "),
                ("FOV", "90"),
                ("MAP", "maps/cave.map"),
                ("LOG", "debug"),
                ("SOMETHING", "else"),
            ])
            .unwrap();
        assert_eq!((settings.width, settings.height), (800, 600));
        assert_eq!(settings.fov, 90.);
        assert_eq!(settings.map, Some(PathBuf::from("maps/cave.map")));
        assert_eq!(settings.target_fps, 60);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Settings::default().apply([("WIDTH", "wide")]).unwrap_err();
        assert!(err.to_string().contains("GRIDCAST_WIDTH"));
        assert!(Settings::default().apply([("HEIGHT", "0")]).is_err());
        assert!(Settings::default().apply([("FOV", "180")]).is_err());
        assert!(Settings::default().apply([("FPS", "0")]).is_err());
        assert!(Settings::default().apply([("MAX_DISTANCE", "-1")]).is_err());
        assert!(Settings::default().apply([("MAX_DISTANCE", "0")]).is_err());
        assert!(Settings::default().apply([("MAX_DISTANCE", "NaN")]).is_err());
        assert!(Settings::default().apply([("MAX_DISTANCE", "inf")]).is_err());
        assert!(Settings::default().apply([("MAX_DISTANCE", "24.5")]).is_ok());
    }

    #[test]
    fn limits_follow_settings() {
        let settings = Settings {
            max_distance: 12.,
            ..Default::default()
        };
        assert_eq!(settings.limits().max_distance, 12.);
        assert_eq!(settings.limits().max_steps, 1024);
    }
}
