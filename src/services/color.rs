// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription color selection.

use crate::models::Color;
use rand::Rng;

/// Chooses the color of a new subscription.
pub trait ColorPicker: Send + Sync {
    fn pick(&self) -> Color;
}

/// Uniformly random palette color.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomColorPicker;

impl ColorPicker for RandomColorPicker {
    fn pick(&self) -> Color {
        let index = rand::rng().random_range(0..Color::ALL.len());
        Color::from_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picker_stays_in_palette() {
        let picker = RandomColorPicker;
        for _ in 0..100 {
            assert!(Color::ALL.contains(&picker.pick()));
        }
    }
}
