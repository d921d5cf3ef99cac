pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod rect;
}

pub mod detection {
    pub mod domain {
        pub mod detection_parser;
        pub mod detection_tensor;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod identity {
    pub mod domain {
        pub mod gallery;
        pub mod identity_matcher;
        pub mod perceptual_hasher;
    }
    pub mod infrastructure;
}

pub mod annotation {
    mod bitmap_font;
    pub mod frame_annotator;
}

pub mod capture {
    pub mod domain {
        pub mod capture_device;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_encoder;
        pub mod image_reader;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod build_gallery_use_case;
    pub mod face_locator;
    pub mod frame_pipeline;
    pub mod frame_processor;
}

pub mod session {
    pub mod capture_session;
    pub mod frame_broadcaster;
    pub mod session_registry;
    pub mod viewer_handle;
}
