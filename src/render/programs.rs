//! Program cache keyed by alias.
//!
//! A program is compiled the first time its alias is bound; uniform and
//! attribute locations are looked up once at that point. A program that
//! fails to compile stays failed: later binds report it as unusable
//! without recompiling.

use std::collections::HashMap;

use super::backend::GraphicsBackend;
use super::shaders::ShaderSet;
use crate::error::{Error, Result};

pub struct ProgramEntry<B: GraphicsBackend> {
    pub program: B::Program,
    uniforms: HashMap<&'static str, B::Uniform>,
    attributes: HashMap<&'static str, u32>,
}

impl<B: GraphicsBackend> ProgramEntry<B> {
    pub fn uniform(&self, name: &str) -> Option<&B::Uniform> {
        self.uniforms.get(name)
    }

    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }
}

enum Slot<B: GraphicsBackend> {
    Ready(ProgramEntry<B>),
    Failed,
}

pub struct ProgramCache<B: GraphicsBackend> {
    slots: HashMap<String, Slot<B>>,
    bound: Option<String>,
}

impl<B: GraphicsBackend> Default for ProgramCache<B> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            bound: None,
        }
    }
}

impl<B: GraphicsBackend> ProgramCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `alias` the active program, compiling it on first use.
    ///
    /// `use_program` is only issued when the alias differs from the one
    /// currently bound.
    pub fn bind(&mut self, backend: &B, alias: &str, set: &ShaderSet) -> Result<&ProgramEntry<B>> {
        if !self.slots.contains_key(alias) {
            match backend.compile_program(alias, set.vertex, set.fragment) {
                Ok(program) => {
                    let entry = Self::locate(backend, alias, program, set);
                    log::debug!("compiled program {alias}");
                    self.slots.insert(alias.to_owned(), Slot::Ready(entry));
                }
                Err(err) => {
                    log::error!("{err}");
                    self.slots.insert(alias.to_owned(), Slot::Failed);
                    return Err(err);
                }
            }
        }

        match self.slots.get(alias) {
            Some(Slot::Ready(entry)) => {
                if self.bound.as_deref() != Some(alias) {
                    backend.use_program(&entry.program);
                    self.bound = Some(alias.to_owned());
                }
                Ok(entry)
            }
            _ => Err(Error::ProgramUnusable(alias.to_owned())),
        }
    }

    /// Alias of the program last made active.
    pub fn bound(&self) -> Option<&str> {
        self.bound.as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn locate(backend: &B, alias: &str, program: B::Program, set: &ShaderSet) -> ProgramEntry<B> {
        let mut uniforms = HashMap::with_capacity(set.uniforms.len());
        for &name in set.uniforms {
            match backend.uniform_location(&program, name) {
                Some(location) => {
                    uniforms.insert(name, location);
                }
                None => log::warn!("program {alias}: uniform {name} is inactive"),
            }
        }

        let mut attributes = HashMap::with_capacity(set.attributes.len());
        for &name in set.attributes {
            match backend.attrib_location(&program, name) {
                Some(location) => {
                    attributes.insert(name, location);
                }
                None => log::warn!("program {alias}: attribute {name} is inactive"),
            }
        }

        ProgramEntry {
            program,
            uniforms,
            attributes,
        }
    }
}
