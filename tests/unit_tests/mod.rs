mod boundary;
mod element;
mod initial;
mod settings;
