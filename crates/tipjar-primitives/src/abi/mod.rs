pub mod name_registry;
