// Copyright 2022, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use tokio::sync::mpsc::UnboundedReceiver;

/// Generate the setter method of a builder field, for the `&mut self` builder pattern.
macro_rules! builder_field {
    ($field:ident, $ty:ty, $wrap:expr) => {
        /// Set the value of the field with the same name.
        pub fn $field(&mut self, value: $ty) -> &mut Self {
            self.$field = $wrap(value);
            self
        }
    };
    ($field:ident, $ty:ty) => {
        builder_field!($field, $ty, ::std::convert::identity);
    };
}
pub(crate) use builder_field;

/// Generate the setter method of a builder field, for the consuming builder pattern.
macro_rules! consuming_builder_field {
    ($field:ident, $ty:ty, $wrap:expr) => {
        /// Set the value of the field with the same name.
        pub fn $field(mut self, value: $ty) -> Self {
            self.$field = $wrap(value);
            self
        }
    };
    ($field:ident, $ty:ty) => {
        consuming_builder_field!($field, $ty, ::std::convert::identity);
    };
}
pub(crate) use consuming_builder_field;

/// Generate the getter method for the field of the struct.
macro_rules! getter_field {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> &$ty {
            &self.$field
        }
    };
}
pub(crate) use getter_field;

/// Clean shutdown a mpsc receiver.
///
/// Call this function before dropping the receiver if the sender is not dropped yet.
pub fn clean_mpsc_receiver<T>(receiver: &mut UnboundedReceiver<T>) {
    receiver.close();
    while receiver.try_recv().is_ok() {}
}

#[cfg(test)]
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    #[derive(Default)]
    struct Foo {
        value: u32,
        name: Option<String>,
    }

    impl Foo {
        getter_field!(value, u32);
        builder_field!(name, String, Some);
    }

    #[test]
    fn test_getter_and_builder_field() {
        let mut foo = Foo { value: 5, ..Default::default() };
        foo.name("bar".to_owned());
        assert_eq!(foo.value(), &5);
        assert_eq!(foo.name.as_deref(), Some("bar"));
    }

    #[test]
    fn test_clean_mpsc_receiver() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        sender.send(1).unwrap();
        sender.send(2).unwrap();
        clean_mpsc_receiver(&mut receiver);
        assert!(sender.send(3).is_err());
        assert!(receiver.try_recv().is_err());
    }
}
