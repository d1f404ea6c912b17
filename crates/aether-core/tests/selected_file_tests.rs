//! Integration tests for file choice decoding.

use aether_core::{FileChoice, SelectedFile};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[test]
fn selected_file_tests_sniffs_png_and_builds_preview() {
    let file = SelectedFile::from_choice(FileChoice::new("rubble.png", PNG_SIGNATURE.to_vec()));

    assert_eq!(file.file_name(), "rubble.png");
    assert_eq!(file.media_type(), "image/png");
    assert_eq!(file.bytes(), &PNG_SIGNATURE);
    assert_eq!(file.preview_uri(), "data:image/png;base64,iVBORw0KGgo=");
}

#[test]
fn selected_file_tests_sniffs_jpeg() {
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    let file = SelectedFile::from_choice(FileChoice::new("site.jpg", jpeg));
    assert_eq!(file.media_type(), "image/jpeg");
}
