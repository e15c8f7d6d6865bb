mod file;
mod settings;

pub use self::{
    file::{Bitcoin, Btsieve, File, Level, Logging},
    settings::Settings,
};
