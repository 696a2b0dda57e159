use cxx_qt_build::{CxxQtBuilder, QmlModule};

fn main() {
    CxxQtBuilder::new_qml_module(QmlModule::new("tenki_ui"))
        .file("src/models/weather_model.rs")
        .build();
}
