//! Built-in disease table
//!
//! Order matters: it is the class order of the trained classifier's output layer.

pub(crate) const BUILTIN_DISEASES: [(&str, &str, &str); 15] = [
    (
        "BACTERIAL SPOT",
        "Penyakit yang disebabkan oleh bakteri pada daun dan buah tanaman, umumnya menyebabkan bercak berwarna gelap.",
        "Pengendalian dengan menggunakan fungisida bakterisida, pengelolaan tanaman yang baik, dan praktik sanitasi.",
    ),
    (
        "BLACK MEASLES",
        "Penyakit yang disebabkan oleh jamur, terlihat sebagai bercak-bercak kecil berwarna coklat atau hitam pada daun.",
        "Pengendalian dengan menyemprotkan fungisida, menjaga kebersihan lingkungan, dan menghindari kelembaban berlebih.",
    ),
    (
        "BLACK ROT",
        "Penyakit yang disebabkan oleh jamur pada tanaman cruciferous, biasanya terlihat sebagai bercak-bercak hitam pada daun.",
        "Pengendalian dengan menjaga kebersihan, menggunakan bibit yang bebas penyakit, dan menghindari kondisi lembab.",
    ),
    (
        "CITRUS GREENING",
        "Penyakit serius pada tanaman jeruk yang disebabkan oleh bakteri, terlihat sebagai daun menguning dan pertumbuhan tidak normal.",
        "Pengendalian dengan mengelola serangga penular vektor, pemangkasan, dan aplikasi antibiotik tertentu.",
    ),
    (
        "LEAF BLIGHT",
        "Penyakit yang disebabkan oleh jamur pada daun tanaman, terlihat sebagai bercak berwarna coklat atau abu-abu pada daun.",
        "Pengendalian dengan menyemprotkan fungisida, menghilangkan daun yang terinfeksi, dan menjaga kebersihan.",
    ),
    (
        "LEAF MOLD",
        "Penyakit yang disebabkan oleh jamur pada daun, umumnya terlihat sebagai bercak putih keabu-abuan pada permukaan daun.",
        "Pengendalian dengan memastikan sirkulasi udara yang baik, menghilangkan daun yang terinfeksi, dan mengelola kelembaban.",
    ),
    (
        "LEAF SCORCH",
        "Penyakit yang menyebabkan daun mengering dan menguning, sering disebabkan oleh bakteri atau jamur patogen.",
        "Pengendalian dengan pengelolaan air yang baik, penyemprotan fungisida, dan memangkas tanaman.",
    ),
    (
        "LEAF SPOT",
        "Penyakit yang menyebabkan bercak berwarna gelap atau coklat pada daun, disebabkan oleh jamur atau bakteri.",
        "Pengendalian dengan menjaga kebersihan, menyemprotkan fungisida, dan mengatur irigasi.",
    ),
    (
        "MOSAIC VIRUS",
        "Penyakit virus yang umum pada tanaman, terlihat sebagai daun menguning dengan pola mosaik atau bercak.",
        "Pengendalian dengan menggunakan bibit bebas virus, mengelola serangga vektor, dan menghilangkan tanaman yang terinfeksi.",
    ),
    (
        "POWDERY MILDEW",
        "Penyakit jamur yang terlihat sebagai serbuk putih pada daun dan bagian tanaman lainnya.",
        "Pengendalian dengan menyemprotkan fungisida, menjaga sirkulasi udara yang baik, dan menjaga tanaman tetap kering.",
    ),
    (
        "RUST",
        "Penyakit yang disebabkan oleh jamur, terlihat sebagai bercak-bercak berwarna coklat atau oranye pada daun dan batang.",
        "Pengendalian dengan menggunakan bibit resisten, menyemprotkan fungisida, dan menjaga kebersihan.",
    ),
    (
        "SCAB",
        "Penyakit jamur yang menyebabkan bercak berwarna gelap atau abu-abu pada daun, buah, dan batang tanaman.",
        "Pengendalian dengan menjaga kebersihan, menggunakan bibit bebas penyakit, dan menyemprotkan fungisida.",
    ),
    (
        "SPIDER MITES",
        "Hama kecil yang menyebabkan kerusakan pada tanaman dengan membuat jaringan halus di bawah daun.",
        "Pengendalian dengan menyemprotkan insektisida, menjaga kelembaban udara, dan membuang daun yang terinfeksi.",
    ),
    (
        "TARGET SPOT",
        "Penyakit yang disebabkan oleh jamur pada daun tanaman, terlihat sebagai bercak berwarna gelap dengan tepi merah.",
        "Pengendalian dengan menyemprotkan fungisida, menjaga sirkulasi udara yang baik, dan memangkas tanaman.",
    ),
    (
        "YELLOW LEAF CURL VIRUS",
        "Penyakit virus yang menyebabkan daun tanaman menguning, keriput, dan berkumpul.",
        "Pengendalian dengan menggunakan bibit bebas virus, mengelola serangga vektor, dan menghilangkan tanaman yang terinfeksi.",
    ),
];
