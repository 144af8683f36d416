// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription model and the fixed color palette.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Display color of a subscription, from a fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "COLOR_1")]
    Color1,
    #[serde(rename = "COLOR_2")]
    Color2,
    #[serde(rename = "COLOR_3")]
    Color3,
    #[serde(rename = "COLOR_4")]
    Color4,
    #[serde(rename = "COLOR_5")]
    Color5,
    #[serde(rename = "COLOR_6")]
    Color6,
    #[serde(rename = "COLOR_7")]
    Color7,
    #[serde(rename = "COLOR_8")]
    Color8,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Color1,
        Color::Color2,
        Color::Color3,
        Color::Color4,
        Color::Color5,
        Color::Color6,
        Color::Color7,
        Color::Color8,
    ];

    /// Pick a palette entry by number, wrapping around the palette size.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Color1 => "COLOR_1",
            Color::Color2 => "COLOR_2",
            Color::Color3 => "COLOR_3",
            Color::Color4 => "COLOR_4",
            Color::Color5 => "COLOR_5",
            Color::Color6 => "COLOR_6",
            Color::Color7 => "COLOR_7",
            Color::Color8 => "COLOR_8",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown color: {0}")]
pub struct UnknownColor(String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = UnknownColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Link between a member and a category they see on their calendar.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub member_id: i64,
    pub category_id: i64,
    #[sqlx(try_from = "String")]
    pub color: Color,
    pub created_at: String,
}
