pub mod installer;
pub mod interpreter;
pub mod virtualenv;

pub use installer::DependencyInstaller;
pub use interpreter::{find_interpreter, Interpreter};
pub use virtualenv::{ActiveEnvironment, VirtualEnv};
