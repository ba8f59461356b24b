//! LED style rendering of a display level
//!
//! Splits the 0..1 range into `num_lights` equal lights and works out how lit
//! each one is.  Thresholds split the range into zones (think green, yellow,
//! red) so a renderer can pick a color per light.

pub const DEFAULT_THRESHOLDS: [f32; 3] = [0.25, 0.8, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// 0 is off, 1 is fully lit
    pub intensity: f32,
    /// index of the threshold zone the light belongs to
    pub zone: usize,
}

#[derive(Debug, Clone)]
pub struct LightLadder {
    num_lights: usize,
    thresholds: Vec<f32>,
    variable_intensity: bool,
}

impl LightLadder {
    /// `num_lights` is raised to at least one, `thresholds` are the top value of each zone
    pub fn new(num_lights: usize, thresholds: &[f32]) -> LightLadder {
        let mut thresholds = thresholds.to_vec();
        if thresholds.is_empty() {
            thresholds.push(1.0);
        }
        thresholds.sort_by(f32::total_cmp);
        LightLadder {
            num_lights: num_lights.max(1),
            thresholds,
            variable_intensity: true,
        }
    }

    /// with variable intensity off a light is either fully on or off
    pub fn set_variable_intensity(&mut self, variable: bool) -> () {
        self.variable_intensity = variable;
    }

    pub fn num_lights(&self) -> usize {
        self.num_lights
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    fn peak_light(&self, peak_level: f32) -> Option<usize> {
        if peak_level > 0.0 {
            Some(((peak_level * self.num_lights as f32) as usize).min(self.num_lights - 1))
        } else {
            None
        }
    }

    fn zone(&self, light_max: f32) -> usize {
        let mut zone = 0;
        for (i, thresh) in self.thresholds.iter().enumerate().take(self.thresholds.len() - 1) {
            if *thresh <= light_max {
                zone = i + 1;
            }
        }
        zone
    }

    pub fn light(&self, idx: usize, level: f32, peak_level: f32) -> Light {
        let n = self.num_lights as f32;
        let light_min = idx as f32 / n;
        let light_max = (idx + 1) as f32 / n;
        let intensity = if self.peak_light(peak_level) == Some(idx) {
            1.0
        } else {
            let v = ((level - light_min) / (light_max - light_min)).clamp(0.0, 1.0);
            if !self.variable_intensity && v > 0.0 {
                1.0
            } else {
                v
            }
        };
        Light {
            intensity,
            zone: self.zone(light_max),
        }
    }

    pub fn lights(&self, level: f32, peak_level: f32) -> impl Iterator<Item = Light> + '_ {
        (0..self.num_lights).map(move |i| self.light(i, level, peak_level))
    }
}

impl Default for LightLadder {
    fn default() -> Self {
        LightLadder::new(30, &DEFAULT_THRESHOLDS)
    }
}

#[cfg(test)]
mod test_light_ladder {
    use super::*;

    #[test]
    fn lights_up_to_level() {
        let ladder = LightLadder::new(10, &DEFAULT_THRESHOLDS);
        let lights: Vec<Light> = ladder.lights(0.35, 0.0).collect();
        assert_eq!(lights.len(), 10);
        assert_eq!(lights[0].intensity, 1.0);
        assert_eq!(lights[2].intensity, 1.0);
        assert!((lights[3].intensity - 0.5).abs() < 1e-5);
        assert_eq!(lights[4].intensity, 0.0);
        assert_eq!(lights[9].intensity, 0.0);
    }

    #[test]
    fn peak_light_is_full() {
        let ladder = LightLadder::new(10, &DEFAULT_THRESHOLDS);
        assert_eq!(ladder.light(7, 0.1, 0.75).intensity, 1.0);
        assert_eq!(ladder.light(6, 0.1, 0.75).intensity, 0.0);
        // a full scale peak stays on the top light
        assert_eq!(ladder.light(9, 0.0, 1.0).intensity, 1.0);
    }

    #[test]
    fn fixed_intensity() {
        let mut ladder = LightLadder::new(10, &DEFAULT_THRESHOLDS);
        ladder.set_variable_intensity(false);
        assert_eq!(ladder.light(3, 0.31, 0.0).intensity, 1.0);
        assert_eq!(ladder.light(4, 0.31, 0.0).intensity, 0.0);
    }

    #[test]
    fn zones_follow_thresholds() {
        let ladder = LightLadder::new(20, &[1.0, 0.8, 0.25]);
        assert_eq!(ladder.thresholds(), &[0.25, 0.8, 1.0]);
        let zones: Vec<usize> = ladder.lights(0.0, 0.0).map(|l| l.zone).collect();
        // light tops at 0.05 .. 1.0
        assert_eq!(zones[0], 0);
        assert_eq!(zones[3], 0);
        assert_eq!(zones[4], 1);
        assert_eq!(zones[14], 1);
        assert_eq!(zones[15], 2);
        assert_eq!(zones[19], 2);
    }

    #[test]
    fn degenerate_setup() {
        let ladder = LightLadder::new(0, &[]);
        assert_eq!(ladder.num_lights(), 1);
        assert_eq!(ladder.light(0, 0.5, 0.0), Light { intensity: 0.5, zone: 0 });
        assert_eq!(LightLadder::default().num_lights(), 30);
    }
}
