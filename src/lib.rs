//! Civ Ascent - deterministic incremental civilization simulation

pub mod city;
pub mod command;
pub mod core;
pub mod diplomacy;
pub mod llm;
pub mod persistence;
pub mod research;
pub mod simulation;
